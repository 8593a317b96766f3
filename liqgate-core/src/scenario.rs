//! Scenario building — gate a structural template against a context.
//!
//! Status is decided only by the three required gates. Optional evidence is
//! carried along for the confluence scorer and never changes status.

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::domain::market::labelled_enum;
use crate::domain::{ContextId, ScenarioId, Timestamp};

/// Structural pattern a scenario instantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateKind {
    /// Sweep of resting liquidity followed by a reversal.
    SweepReversal,
    /// Continuation from a respected order block.
    OrderBlockContinuation,
    /// Return into a fair value gap before continuation.
    FvgRebalance,
    /// Retest of a failed order block from the other side.
    BreakerRetest,
    /// Accumulation, manipulation, distribution.
    PowerOfThree,
}

labelled_enum!(TemplateKind, "template kind", {
    SweepReversal => "sweep-reversal",
    OrderBlockContinuation => "order-block-continuation",
    FvgRebalance => "fvg-rebalance",
    BreakerRetest => "breaker-retest",
    PowerOfThree => "power-of-three",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioStatus {
    Forming,
    Valid,
    Invalidated,
}

labelled_enum!(ScenarioStatus, "scenario status", {
    Forming => "forming",
    Valid => "valid",
    Invalidated => "invalidated",
});

/// The three gates that must all hold for a scenario to be valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RequiredGates {
    pub htf_bias_aligned: bool,
    pub liquidity_event: bool,
    pub structural_confirmation: bool,
}

impl RequiredGates {
    pub fn all_pass(&self) -> bool {
        self.htf_bias_aligned && self.liquidity_event && self.structural_confirmation
    }
}

/// Optional supporting evidence. `None` and `Some(false)` both mean "absent".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OptionalEvidence {
    #[serde(default)]
    pub order_block: Option<bool>,
    #[serde(default)]
    pub fair_value_gap: Option<bool>,
    #[serde(default)]
    pub breaker_block: Option<bool>,
    #[serde(default)]
    pub discount_premium: Option<bool>,
    #[serde(default)]
    pub buy_sell_liquidity: Option<bool>,
    /// Dampener: scheduled news risk around the idea.
    #[serde(default)]
    pub news_risk: Option<bool>,
}

/// Why a scenario was invalidated.
///
/// Only `ContextNotTradable` is produced today. The other reasons are reserved
/// for structural checks that do not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvalidationReason {
    ContextNotTradable,
    StructureBreak,
    LiquidityAgainst,
}

/// A gated structural trade idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub template_kind: TemplateKind,
    pub context_id: ContextId,
    pub status: ScenarioStatus,
    pub required_gates: RequiredGates,
    pub optional_evidence: OptionalEvidence,
    pub evaluated_at: Timestamp,
    /// Set only when the caller applied an invalidation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalidation_reason: Option<InvalidationReason>,
}

impl Scenario {
    pub fn is_valid(&self) -> bool {
        self.status == ScenarioStatus::Valid
    }

    /// Return a copy of this scenario with `check` applied.
    ///
    /// A non-invalidating check yields an unchanged copy.
    pub fn apply_invalidation(&self, check: &InvalidationCheck) -> Scenario {
        let mut next = self.clone();
        if check.invalidated {
            next.status = ScenarioStatus::Invalidated;
            next.invalidation_reason = check.reason;
        }
        next
    }
}

/// Outcome of [`invalidate_on_context_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidationCheck {
    pub invalidated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<InvalidationReason>,
}

impl InvalidationCheck {
    pub fn keep() -> Self {
        Self { invalidated: false, reason: None }
    }

    pub fn invalidate(reason: InvalidationReason) -> Self {
        Self { invalidated: true, reason: Some(reason) }
    }
}

/// Gate `template_kind` against `context`.
///
/// `valid` iff all three required gates are true, `forming` otherwise.
pub fn build_scenario(
    template_kind: TemplateKind,
    context: &Context,
    required_gates: &RequiredGates,
    optional_evidence: &OptionalEvidence,
    evaluated_at: Timestamp,
) -> Scenario {
    let context_id = context.id();
    let id = ScenarioId::derive(template_kind.as_str(), &context_id, evaluated_at);
    let status = if required_gates.all_pass() {
        ScenarioStatus::Valid
    } else {
        ScenarioStatus::Forming
    };

    Scenario {
        id,
        template_kind,
        context_id,
        status,
        required_gates: *required_gates,
        optional_evidence: *optional_evidence,
        evaluated_at,
        invalidation_reason: None,
    }
}

/// Check whether `next_context` still supports `scenario`.
///
/// Never mutates the scenario; the caller decides whether to apply the result.
pub fn invalidate_on_context_change(
    _scenario: &Scenario,
    next_context: &Context,
) -> InvalidationCheck {
    if next_context.is_tradable() {
        InvalidationCheck::keep()
    } else {
        InvalidationCheck::invalidate(InvalidationReason::ContextNotTradable)
    }
}
