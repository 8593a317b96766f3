//! End-to-end stage chain tests: point → context → scenario → {score, risk} → decision.
//!
//! Covers the reference examples, replay determinism (same inputs, any
//! wall-clock time, same outputs), and non-mutation of every argument.

use chrono::{DateTime, TimeZone, Utc};

use liqgate_core::domain::{PriceRange, TradeDirection};
use liqgate_core::{
    build_risk_contract, build_scenario, create_point, derive_context, derive_decision,
    invalidate_on_context_change, score_confluence, Action, ConfluenceWeights, ContextStatus,
    GuardrailResult, HtfRelation, OptionalEvidence, Permission, Point, PointInput, PolicyReason,
    RequiredGates, RiskCandidates, RiskInvalidation, RiskStatus, ScenarioStatus, TemplateKind,
};

fn t(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn point_input(id: &str, kind: &str, tf: &str, bias: &str, low: f64, high: f64) -> PointInput {
    PointInput {
        id: id.into(),
        kind: kind.into(),
        timeframe: tf.into(),
        price_range: PriceRange::new(low, high),
        direction_bias: bias.into(),
        valid_from: t(1_700_000_000),
        valid_until: t(1_700_086_400),
        mitigated: false,
        mitigation_timestamp: None,
    }
}

fn point(id: &str, kind: &str, bias: &str, low: f64, high: f64) -> Point {
    create_point(&point_input(id, kind, "15m", bias, low, high)).unwrap()
}

fn reference_weights() -> ConfluenceWeights {
    ConfluenceWeights {
        order_block: 20.0,
        fair_value_gap: 15.0,
        breaker_block: 25.0,
        discount_premium: 15.0,
        buy_sell_liquidity: 25.0,
        news_risk: -20.0,
    }
}

fn all_gates() -> RequiredGates {
    RequiredGates {
        htf_bias_aligned: true,
        liquidity_event: true,
        structural_confirmation: true,
    }
}

fn full_evidence(news_risk: bool) -> OptionalEvidence {
    OptionalEvidence {
        order_block: Some(true),
        fair_value_gap: Some(true),
        breaker_block: Some(true),
        discount_premium: Some(true),
        buy_sell_liquidity: Some(true),
        news_risk: Some(news_risk),
    }
}

/// Everything one chain run produces, serialized for byte comparison.
fn run_chain(entry_input: &PointInput, htf_input: &PointInput, at: DateTime<Utc>) -> String {
    let entry = create_point(entry_input).unwrap();
    let htf = create_point(htf_input).unwrap();
    let ctx = derive_context(&entry, at, Some(&htf));
    let scenario = build_scenario(
        TemplateKind::SweepReversal,
        &ctx,
        &all_gates(),
        &full_evidence(true),
        at,
    );
    let score = score_confluence(&scenario, &reference_weights(), at).unwrap();
    let candidates = RiskCandidates {
        entry: entry.clone(),
        direction: TradeDirection::Bullish,
        stop_loss_candidates: vec![point("sl", "order-block", "bullish", 100.0, 105.0)],
        take_profit_candidates: vec![point("tp1", "buy-side-liquidity", "bullish", 180.0, 185.0)],
    };
    let contract = build_risk_contract(&scenario, Some(&score), &candidates, at);
    let decision = derive_decision(&GuardrailResult {
        permission: Permission::Allowed,
        reason: PolicyReason::PolicyPermits,
    });
    serde_json::to_string(&(ctx, scenario, score, contract, decision)).unwrap()
}

#[test]
fn reference_bullish_chain() {
    let entry = point("entry", "order-block", "bullish", 120.0, 125.0);
    let htf =
        create_point(&point_input("htf", "fair-value-gap", "4h", "bullish", 90.0, 130.0)).unwrap();
    let at = t(1_700_040_000);

    let ctx = derive_context(&entry, at, Some(&htf));
    assert_eq!(ctx.status, ContextStatus::Active);
    assert_eq!(ctx.htf_relation, HtfRelation::Aligned);
    assert!(ctx.is_tradable());

    let scenario = build_scenario(
        TemplateKind::SweepReversal,
        &ctx,
        &all_gates(),
        &full_evidence(false),
        at,
    );
    assert_eq!(scenario.status, ScenarioStatus::Valid);
    assert!(!invalidate_on_context_change(&scenario, &ctx).invalidated);

    let score = score_confluence(&scenario, &reference_weights(), at).unwrap();
    assert_eq!(score.raw_score, 100.0);
    assert_eq!(score.normalized_score, 100.0);
    assert_eq!(score.scenario_id, scenario.id);

    let candidates = RiskCandidates {
        entry,
        direction: TradeDirection::Bullish,
        stop_loss_candidates: vec![point("sl", "order-block", "bullish", 100.0, 105.0)],
        take_profit_candidates: vec![point("tp1", "buy-side-liquidity", "bullish", 180.0, 185.0)],
    };
    let contract = build_risk_contract(&scenario, Some(&score), &candidates, at);
    assert_eq!(contract.status, RiskStatus::Valid);
    assert!((contract.rr.unwrap() - 3.6667).abs() < 1e-3);
    assert_eq!(contract.confidence, Some(100.0));
    assert_eq!(contract.scenario_id, scenario.id);

    let decision = derive_decision(&GuardrailResult {
        permission: Permission::Allowed,
        reason: PolicyReason::PolicyPermits,
    });
    assert_eq!(decision.action, Action::PrepareEntry);
}

#[test]
fn reference_low_rr_chain() {
    let entry = point("entry", "order-block", "bullish", 120.0, 125.0);
    let ctx = derive_context(&entry, t(1_700_040_000), Some(&entry));
    let scenario = build_scenario(
        TemplateKind::OrderBlockContinuation,
        &ctx,
        &all_gates(),
        &OptionalEvidence::default(),
        t(1_700_040_000),
    );
    let candidates = RiskCandidates {
        entry,
        direction: TradeDirection::Bullish,
        stop_loss_candidates: vec![point("sl", "previous-low", "bullish", 60.0, 65.0)],
        take_profit_candidates: vec![point("tp1", "previous-high", "bullish", 135.0, 140.0)],
    };
    let contract = build_risk_contract(&scenario, None, &candidates, t(1_700_040_000));
    assert_eq!(contract.status, RiskStatus::Invalid);
    assert_eq!(contract.invalidation_reason, Some(RiskInvalidation::RrTooLow));
    assert!((contract.rr.unwrap() - 0.18).abs() < 0.01);
}

#[test]
fn forming_scenario_is_rejected_downstream() {
    let entry = point("entry", "order-block", "bullish", 120.0, 125.0);
    let ctx = derive_context(&entry, t(1_700_040_000), None);
    let gates = RequiredGates {
        htf_bias_aligned: true,
        liquidity_event: false,
        structural_confirmation: true,
    };
    let scenario = build_scenario(
        TemplateKind::BreakerRetest,
        &ctx,
        &gates,
        &full_evidence(false),
        t(1_700_040_000),
    );
    assert_eq!(scenario.status, ScenarioStatus::Forming);
    assert!(score_confluence(&scenario, &reference_weights(), t(1_700_040_000)).is_err());

    let candidates = RiskCandidates {
        entry,
        direction: TradeDirection::Bullish,
        stop_loss_candidates: vec![],
        take_profit_candidates: vec![],
    };
    let contract = build_risk_contract(&scenario, None, &candidates, t(1_700_040_000));
    assert_eq!(contract.invalidation_reason, Some(RiskInvalidation::ScenarioNotValid));
}

#[test]
fn manual_review_permission_keeps_reason() {
    let decision = derive_decision(&GuardrailResult {
        permission: Permission::ManualReviewOnly,
        reason: PolicyReason::DrawdownLimit,
    });
    assert_eq!(decision.action, Action::RequestManualReview);
    assert_eq!(decision.reason, PolicyReason::DrawdownLimit);
}

#[test]
fn chain_output_is_byte_identical_across_runs() {
    let entry = point_input("entry", "order-block", "15m", "bullish", 120.0, 125.0);
    let htf = point_input("htf", "fair-value-gap", "4h", "bullish", 90.0, 130.0);
    let at = t(1_700_040_000);

    let first = run_chain(&entry, &htf, at);
    for _ in 0..5 {
        assert_eq!(run_chain(&entry, &htf, at), first);
    }
}

#[test]
fn evaluation_time_far_from_now_is_still_deterministic() {
    // A recorded instant in the past: results depend only on the argument.
    let entry = point_input("entry", "order-block", "15m", "bullish", 120.0, 125.0);
    let htf = point_input("htf", "fair-value-gap", "4h", "bullish", 90.0, 130.0);
    let at = t(1_700_000_000);
    let a = run_chain(&entry, &htf, at);
    let b = run_chain(&entry, &htf, at);
    assert_eq!(a, b);
    assert!(a.contains("\"status\":\"active\""));
}

#[test]
fn stages_do_not_mutate_arguments() {
    let entry_input = point_input("entry", "order-block", "15m", "bullish", 120.0, 125.0);
    let input_snapshot = entry_input.clone();
    let entry = create_point(&entry_input).unwrap();
    assert_eq!(entry_input, input_snapshot);

    let entry_snapshot = serde_json::to_string(&entry).unwrap();
    let ctx = derive_context(&entry, t(1_700_040_000), Some(&entry));
    assert_eq!(serde_json::to_string(&entry).unwrap(), entry_snapshot);

    let ctx_snapshot = serde_json::to_string(&ctx).unwrap();
    let gates = all_gates();
    let evidence = full_evidence(true);
    let scenario =
        build_scenario(TemplateKind::PowerOfThree, &ctx, &gates, &evidence, t(1_700_040_000));
    assert_eq!(serde_json::to_string(&ctx).unwrap(), ctx_snapshot);
    assert_eq!(gates, all_gates());
    assert_eq!(evidence, full_evidence(true));

    let scenario_snapshot = serde_json::to_string(&scenario).unwrap();
    let weights = reference_weights();
    let score = score_confluence(&scenario, &weights, t(1_700_040_000)).unwrap();
    assert_eq!(weights, reference_weights());

    let candidates = RiskCandidates {
        entry,
        direction: TradeDirection::Bullish,
        stop_loss_candidates: vec![point("sl", "order-block", "bullish", 100.0, 105.0)],
        take_profit_candidates: vec![
            point("tp2", "previous-high", "bullish", 200.0, 210.0),
            point("tp1", "buy-side-liquidity", "bullish", 180.0, 185.0),
        ],
    };
    let candidates_snapshot = serde_json::to_string(&candidates).unwrap();
    let _ = build_risk_contract(&scenario, Some(&score), &candidates, t(1_700_040_000));
    assert_eq!(serde_json::to_string(&candidates).unwrap(), candidates_snapshot);

    let _ = invalidate_on_context_change(&scenario, &ctx);
    assert_eq!(serde_json::to_string(&scenario).unwrap(), scenario_snapshot);
}
