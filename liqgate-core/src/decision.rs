//! Decision derivation — permission in, action out.
//!
//! Permission is computed by an external guardrail. This stage only maps it to
//! what should happen next and carries the reason through untouched.

use serde::{Deserialize, Serialize};

use crate::domain::market::labelled_enum;

/// Permission produced by the external guardrail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Permission {
    Allowed,
    Blocked,
    ManualReviewOnly,
    EscalationOnly,
}

labelled_enum!(Permission, "permission", {
    Allowed => "allowed",
    Blocked => "blocked",
    ManualReviewOnly => "manual-review-only",
    EscalationOnly => "escalation-only",
});

/// Why the guardrail produced its permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyReason {
    PolicyPermits,
    NewsBlackout,
    DrawdownLimit,
    LowConfidence,
    ConflictingBias,
    OperatorHold,
}

labelled_enum!(PolicyReason, "policy reason", {
    PolicyPermits => "POLICY_PERMITS",
    NewsBlackout => "NEWS_BLACKOUT",
    DrawdownLimit => "DRAWDOWN_LIMIT",
    LowConfidence => "LOW_CONFIDENCE",
    ConflictingBias => "CONFLICTING_BIAS",
    OperatorHold => "OPERATOR_HOLD",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuardrailResult {
    pub permission: Permission,
    pub reason: PolicyReason,
}

/// What downstream systems should do with the idea.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    NoAction,
    RequestManualReview,
    PrepareEntry,
}

labelled_enum!(Action, "action", {
    NoAction => "no-action",
    RequestManualReview => "request-manual-review",
    PrepareEntry => "prepare-entry",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecisionResult {
    pub action: Action,
    pub reason: PolicyReason,
}

pub fn derive_decision(guardrail: &GuardrailResult) -> DecisionResult {
    let action = match guardrail.permission {
        Permission::Blocked => Action::NoAction,
        Permission::ManualReviewOnly | Permission::EscalationOnly => Action::RequestManualReview,
        Permission::Allowed => Action::PrepareEntry,
    };
    DecisionResult {
        action,
        reason: guardrail.reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_table() {
        let cases = [
            (Permission::Blocked, Action::NoAction),
            (Permission::ManualReviewOnly, Action::RequestManualReview),
            (Permission::EscalationOnly, Action::RequestManualReview),
            (Permission::Allowed, Action::PrepareEntry),
        ];
        for (permission, expected) in cases {
            let d = derive_decision(&GuardrailResult {
                permission,
                reason: PolicyReason::LowConfidence,
            });
            assert_eq!(d.action, expected, "{permission:?}");
            assert_eq!(d.reason, PolicyReason::LowConfidence);
        }
    }

    #[test]
    fn manual_review_carries_reason_verbatim() {
        let d = derive_decision(&GuardrailResult {
            permission: Permission::ManualReviewOnly,
            reason: PolicyReason::ConflictingBias,
        });
        assert_eq!(d.action, Action::RequestManualReview);
        assert_eq!(d.reason, PolicyReason::ConflictingBias);
    }

    #[test]
    fn labels_match_wire_names() {
        for reason in PolicyReason::ALL {
            let json = serde_json::to_string(reason).unwrap();
            assert_eq!(json, format!("\"{}\"", reason.as_str()));
        }
        assert_eq!("escalation-only".parse::<Permission>().unwrap(), Permission::EscalationOnly);
        assert_eq!(Action::PrepareEntry.to_string(), "prepare-entry");
    }

    #[test]
    fn wire_format() {
        let g: GuardrailResult =
            serde_json::from_str(r#"{"permission":"manual-review-only","reason":"NEWS_BLACKOUT"}"#)
                .unwrap();
        let d = derive_decision(&g);
        assert_eq!(
            serde_json::to_string(&d).unwrap(),
            r#"{"action":"request-manual-review","reason":"NEWS_BLACKOUT"}"#
        );
    }
}
