//! liqgate core — the six pure stages that turn a liquidity observation into an action.
//!
//! Stages, in dependency order:
//! - Liquidity point validation (`point`)
//! - Time-indexed context derivation (`context`)
//! - Structural scenario gating (`scenario`)
//! - Confluence quality scoring (`confluence`)
//! - Risk structure validation (`risk`)
//! - Permission-to-action derivation (`decision`)
//!
//! Every stage is a plain synchronous function over its arguments. Nothing here
//! reads the clock, draws randomness, performs I/O, or logs. Stages hand each
//! other identifiers, never owned upstream records.

pub mod confluence;
pub mod context;
pub mod decision;
pub mod domain;
pub mod point;
pub mod risk;
pub mod scenario;

pub use confluence::{
    score_confluence, ConfluenceFactor, ConfluenceScore, ConfluenceWeights, DampenerImpact,
    ScoreBreakdown, ScoreError,
};
pub use context::{derive_context, Context, ContextStatus, HtfRelation};
pub use decision::{
    derive_decision, Action, DecisionResult, GuardrailResult, Permission, PolicyReason,
};
pub use point::{create_point, is_eligible_for_entry, Point, PointError, PointInput};
pub use risk::{
    build_risk_contract, RiskCandidates, RiskContract, RiskInvalidation, RiskStatus, StopLoss,
    StopLossKind, TakeProfit, TargetLevel, TargetProbability, MIN_RISK_REWARD,
};
pub use scenario::{
    build_scenario, invalidate_on_context_change, InvalidationCheck, InvalidationReason,
    OptionalEvidence, RequiredGates, Scenario, ScenarioStatus, TemplateKind,
};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: every record crossing a stage boundary is Send + Sync.
    ///
    /// Independent signals are evaluated on worker threads by the runner.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Point>();
        require_sync::<Point>();
        require_send::<PointInput>();
        require_sync::<PointInput>();
        require_send::<Context>();
        require_sync::<Context>();
        require_send::<Scenario>();
        require_sync::<Scenario>();
        require_send::<ConfluenceWeights>();
        require_sync::<ConfluenceWeights>();
        require_send::<ConfluenceScore>();
        require_sync::<ConfluenceScore>();
        require_send::<RiskCandidates>();
        require_sync::<RiskCandidates>();
        require_send::<RiskContract>();
        require_sync::<RiskContract>();
        require_send::<GuardrailResult>();
        require_sync::<GuardrailResult>();
        require_send::<DecisionResult>();
        require_sync::<DecisionResult>();

        require_send::<PointError>();
        require_sync::<PointError>();
        require_send::<ScoreError>();
        require_sync::<ScoreError>();
    }

    /// Architecture contract: the scenario references its context by id only.
    ///
    /// If someone embeds the `Context` record, this stops compiling.
    #[test]
    fn scenario_holds_context_id_not_context() {
        fn _context_ref(s: &Scenario) -> &domain::ContextId {
            &s.context_id
        }
    }

    /// Architecture contract: the decision stage sees only the guardrail result.
    #[test]
    fn decision_takes_only_guardrail() {
        let _f: fn(&GuardrailResult) -> DecisionResult = derive_decision;
    }
}
