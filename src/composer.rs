//! Patient-facing reply text.
//!
//! Replies only claim staff involvement that actually happened: the wording
//! follows the notification status of the dispatched decision.

use crate::models::enums::{EscalationLevel, Intent, NotificationStatus};
use crate::models::{ClassificationResult, PolicyDecision};

const EMERGENCY_REPLY: &str = "I've immediately notified the emergency response team. \
Someone will be with you right away. Please stay calm and remain where you are.";

const EMERGENCY_UNREACHED_REPLY: &str = "I'm having trouble reaching the emergency response team. \
Please press your call button now or call out for help. Stay where you are.";

const INFORMED_NURSE_REPLY: &str = "I hear you. I've let your nurse know, \
and they will check on you as soon as possible.";

const CALL_BUTTON_HINT: &str = "If you need help right away, please press your call button.";

const GENERIC_REPLY: &str = "I've noted your request. \
If you need someone from the care team, please press your call button.";

pub trait ResponseComposer: Send + Sync {
    fn compose(
        &self,
        query_text: &str,
        classification: &ClassificationResult,
        decision: &PolicyDecision,
        notification: NotificationStatus,
    ) -> String;
}

/// Fixed reply templates keyed by decision, with comfort answers for common
/// room requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateComposer;

impl TemplateComposer {
    // Auto-responded requests notify nobody, so these never promise staff action.
    fn comfort_reply(&self, query_lower: &str) -> String {
        let has = |words: &[&str]| {
            query_lower
                .split(|c: char| !c.is_alphanumeric())
                .any(|token| words.contains(&token))
        };

        if has(&["water"]) {
            "There should be a water jug on your bedside table. \
             If it's empty, press your call button and someone will refill it."
                .into()
        } else if has(&["temperature", "hot", "cold", "warm"]) {
            "The room thermostat is next to the door. \
             If you'd like an extra blanket, press your call button."
                .into()
        } else if has(&["tv", "television", "remote", "channel"]) {
            "The TV remote should be on your bedside table.".into()
        } else if has(&["light", "lights"]) {
            "You can adjust the lights using the control panel on the side of your bed.".into()
        } else if has(&["visitor", "visitors", "visiting", "family"]) {
            "Visiting hours are from 10 AM to 8 PM daily. \
             Visitors should check in at the nurse's station."
                .into()
        } else if has(&["time"]) {
            format!(
                "The current time is {}.",
                chrono::Local::now().format("%I:%M %p")
            )
        } else {
            GENERIC_REPLY.into()
        }
    }
}

impl ResponseComposer for TemplateComposer {
    fn compose(
        &self,
        query_text: &str,
        classification: &ClassificationResult,
        decision: &PolicyDecision,
        notification: NotificationStatus,
    ) -> String {
        let delivered = notification == NotificationStatus::Delivered;
        let staff = if decision.escalation == EscalationLevel::Doctor {
            "doctor"
        } else {
            "nurse"
        };

        match decision.escalation {
            EscalationLevel::Emergency if delivered => EMERGENCY_REPLY.into(),
            EscalationLevel::Emergency => EMERGENCY_UNREACHED_REPLY.into(),
            EscalationLevel::Nurse | EscalationLevel::Doctor if decision.requires_human_approval => {
                if delivered {
                    format!(
                        "I understand you need assistance. I've notified your {staff} about your request. \
                         They will be with you shortly to help. Is there anything else I can assist you \
                         with while you wait?"
                    )
                } else {
                    format!(
                        "I understand you need assistance. I couldn't reach your {staff} just now, \
                         but your request is waiting for their review. {CALL_BUTTON_HINT}"
                    )
                }
            }
            EscalationLevel::Nurse | EscalationLevel::Doctor if delivered => {
                INFORMED_NURSE_REPLY.into()
            }
            EscalationLevel::Nurse | EscalationLevel::Doctor => {
                format!("I hear you. I couldn't reach your {staff} just now. {CALL_BUTTON_HINT}")
            }
            EscalationLevel::None if classification.intent == Intent::NonMedical => {
                self.comfort_reply(&query_text.to_lowercase())
            }
            EscalationLevel::None => GENERIC_REPLY.into(),
        }
    }
}
