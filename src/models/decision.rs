use serde::{Deserialize, Serialize};

use super::enums::EscalationLevel;

/// Identifier of the policy rule that produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyId {
    EmergencyOverride,
    MedicationRequiresApproval,
    MedicalRequiresApproval,
    RepeatedRequestEscalation,
    DistressEscalation,
    AutoRespondEligible,
}

impl PolicyId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmergencyOverride => "emergency_override",
            Self::MedicationRequiresApproval => "medication_requires_approval",
            Self::MedicalRequiresApproval => "medical_requires_approval",
            Self::RepeatedRequestEscalation => "repeated_request_escalation",
            Self::DistressEscalation => "distress_escalation",
            Self::AutoRespondEligible => "auto_respond_eligible",
        }
    }
}

impl std::fmt::Display for PolicyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Escalation decision for one query.
///
/// Built only by the policy evaluator; fields are never modified afterwards
/// and the whole value is persisted verbatim in the audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub escalation: EscalationLevel,
    pub requires_human_approval: bool,
    /// Ordered, for explainability.
    pub matched_policies: Vec<PolicyId>,
    /// Deterministic template text, never model output.
    pub reasoning: String,
    /// Expected staff response time in seconds.
    pub estimated_response_secs: u32,
}

impl PolicyDecision {
    /// The rule that decided, i.e. the first matched policy.
    pub fn primary_policy(&self) -> Option<PolicyId> {
        self.matched_policies.first().copied()
    }

    pub fn notifies_staff(&self) -> bool {
        self.escalation != EscalationLevel::None
    }
}
