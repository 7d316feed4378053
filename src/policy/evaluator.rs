use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::enums::{DistressLevel, Intent};
use crate::models::{PatientContext, PolicyDecision};

use super::rules::{estimated_response_secs, reasoning, rules};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Invalid policy input: {0}")]
    InvalidInput(String),
}

/// Everything the policy table looks at for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyInput {
    pub intent: Intent,
    pub distress: DistressLevel,
    pub repetition_count: i64,
    pub is_medication_request: bool,
    pub patient: PatientContext,
}

impl PolicyInput {
    /// Build an input from wire strings. Unknown values are rejected, never
    /// defaulted.
    pub fn from_raw(
        intent: &str,
        distress: &str,
        repetition_count: i64,
        is_medication_request: bool,
        patient: PatientContext,
    ) -> Result<Self, PolicyError> {
        let intent = Intent::from_str(intent)
            .map_err(|e| PolicyError::InvalidInput(format!("unknown intent '{}'", e.value)))?;
        let distress = DistressLevel::from_str(distress).map_err(|e| {
            PolicyError::InvalidInput(format!("unknown distress level '{}'", e.value))
        })?;
        let input = Self {
            intent,
            distress,
            repetition_count,
            is_medication_request,
            patient,
        };
        input.validate()?;
        Ok(input)
    }

    fn validate(&self) -> Result<(), PolicyError> {
        if self.repetition_count < 0 {
            return Err(PolicyError::InvalidInput(format!(
                "repetition_count must be >= 0, got {}",
                self.repetition_count
            )));
        }
        Ok(())
    }
}

/// Evaluate the policy table against one input.
///
/// Deterministic: the same input always yields the same decision. Rules are
/// checked in order and the first match decides.
pub fn evaluate(input: &PolicyInput) -> Result<PolicyDecision, PolicyError> {
    input.validate()?;

    for rule in rules() {
        if rule.condition.matches(input) {
            tracing::debug!(
                rule_id = rule.id.as_str(),
                patient_id = %input.patient.id,
                escalation = ?rule.escalation,
                requires_approval = rule.requires_approval,
                "Policy rule matched"
            );

            return Ok(PolicyDecision {
                escalation: rule.escalation,
                requires_human_approval: rule.requires_approval,
                matched_policies: vec![rule.id],
                reasoning: reasoning(rule.id, input),
                estimated_response_secs: estimated_response_secs(
                    rule.escalation,
                    rule.requires_approval,
                ),
            });
        }
    }

    // The last rule matches unconditionally.
    Err(PolicyError::InvalidInput("no policy rule matched".into()))
}
