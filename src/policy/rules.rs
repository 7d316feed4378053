use crate::models::enums::{DistressLevel, EscalationLevel, Intent};
use crate::models::PolicyId;

use super::PolicyInput;

/// Similar requests in the recent window at which an unanswered need is
/// escalated to the nurse.
pub const REPEATED_REQUEST_THRESHOLD: i64 = 3;

/// One entry in the ordered policy table.
pub(super) struct PolicyRule {
    pub id: PolicyId,
    pub condition: PolicyCondition,
    pub escalation: EscalationLevel,
    pub requires_approval: bool,
}

pub(super) enum PolicyCondition {
    /// Emergency intent or HIGH distress.
    EmergencySignal,
    MedicationRequest,
    MedicalIntent,
    RepeatedRequest { threshold: i64 },
    DistressAt(DistressLevel),
    Always,
}

impl PolicyCondition {
    pub fn matches(&self, input: &PolicyInput) -> bool {
        match self {
            Self::EmergencySignal => {
                input.intent == Intent::Emergency || input.distress == DistressLevel::High
            }
            Self::MedicationRequest => input.is_medication_request,
            Self::MedicalIntent => input.intent == Intent::Medical,
            Self::RepeatedRequest { threshold } => input.repetition_count >= *threshold,
            Self::DistressAt(level) => input.distress == *level,
            Self::Always => true,
        }
    }
}

// ── Rule registry ───────────────────────────────────────────

/// The policy table in evaluation order. First match wins, and the last rule
/// always matches, so every input maps to exactly one rule.
pub(super) fn rules() -> &'static [PolicyRule] {
    static RULES: [PolicyRule; 6] = [
        PolicyRule {
            id: PolicyId::EmergencyOverride,
            condition: PolicyCondition::EmergencySignal,
            escalation: EscalationLevel::Emergency,
            requires_approval: false,
        },
        PolicyRule {
            id: PolicyId::MedicationRequiresApproval,
            condition: PolicyCondition::MedicationRequest,
            escalation: EscalationLevel::Nurse,
            requires_approval: true,
        },
        PolicyRule {
            id: PolicyId::MedicalRequiresApproval,
            condition: PolicyCondition::MedicalIntent,
            escalation: EscalationLevel::Nurse,
            requires_approval: true,
        },
        PolicyRule {
            id: PolicyId::RepeatedRequestEscalation,
            condition: PolicyCondition::RepeatedRequest {
                threshold: REPEATED_REQUEST_THRESHOLD,
            },
            escalation: EscalationLevel::Nurse,
            requires_approval: false,
        },
        PolicyRule {
            id: PolicyId::DistressEscalation,
            condition: PolicyCondition::DistressAt(DistressLevel::Medium),
            escalation: EscalationLevel::Nurse,
            requires_approval: false,
        },
        PolicyRule {
            id: PolicyId::AutoRespondEligible,
            condition: PolicyCondition::Always,
            escalation: EscalationLevel::None,
            requires_approval: false,
        },
    ];
    &RULES
}

// ── Templates ───────────────────────────────────────────────

/// Human-readable explanation for the rule that decided. Fixed text with the
/// input values filled in.
pub(super) fn reasoning(id: PolicyId, input: &PolicyInput) -> String {
    match id {
        PolicyId::EmergencyOverride => format!(
            "Emergency detected (intent {}, distress {}); immediate escalation to the emergency team without approval.",
            input.intent, input.distress
        ),
        PolicyId::MedicationRequiresApproval => format!(
            "Medication-related request (intent {}); nurse approval is mandatory before any response.",
            input.intent
        ),
        PolicyId::MedicalRequiresApproval => format!(
            "Medical request (distress {}); nurse approval required before responding.",
            input.distress
        ),
        PolicyId::RepeatedRequestEscalation => format!(
            "Patient has repeated a similar request {} times in the recent window; nurse notified to check in.",
            input.repetition_count
        ),
        PolicyId::DistressEscalation => format!(
            "Patient showing {} distress; nurse notified.",
            input.distress
        ),
        PolicyId::AutoRespondEligible => format!(
            "Non-medical request (intent {}) with no escalation signals; eligible for automatic response.",
            input.intent
        ),
    }
}

/// Expected time in seconds until staff respond to the decision.
pub(super) fn estimated_response_secs(escalation: EscalationLevel, requires_approval: bool) -> u32 {
    match (escalation, requires_approval) {
        (EscalationLevel::Emergency, _) => 60,
        (_, true) => 300,
        (EscalationLevel::None, false) => 5,
        (_, false) => 180,
    }
}
