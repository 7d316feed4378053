use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A wire string that does not name any variant of the target enum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid enum value for {field}: {value}")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Serde uses the same wire strings as `as_str`.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Intent {
    NonMedical => "NON_MEDICAL",
    Medical => "MEDICAL",
    Emergency => "EMERGENCY",
});

// Variant order is severity order; comparisons rely on it.
str_enum!(DistressLevel {
    None => "NONE",
    Low => "LOW",
    Medium => "MEDIUM",
    High => "HIGH",
});

str_enum!(EscalationLevel {
    None => "NONE",
    Nurse => "NURSE",
    Doctor => "DOCTOR",
    Emergency => "EMERGENCY",
});

str_enum!(StaffRole {
    Nurse => "NURSE",
    Doctor => "DOCTOR",
    EmergencyTeam => "EMERGENCY_TEAM",
});

str_enum!(NotificationPriority {
    Low => "LOW",
    Medium => "MEDIUM",
    High => "HIGH",
    Critical => "CRITICAL",
});

str_enum!(NotificationStatus {
    Delivered => "DELIVERED",
    Failed => "FAILED",
    NotAttempted => "NOT_ATTEMPTED",
});

str_enum!(ApprovalStatus {
    Pending => "PENDING",
    Approved => "APPROVED",
    Rejected => "REJECTED",
});

str_enum!(ResolutionStatus {
    Completed => "COMPLETED",
    Pending => "PENDING",
    Escalated => "ESCALATED",
});

str_enum!(ClassificationSource {
    Keyword => "keyword",
    Llm => "llm",
});

str_enum!(AlertKind {
    EmergencyNotificationFailed => "emergency_notification_failed",
});

impl NotificationPriority {
    /// Delivery channels for a priority: dashboard always, push from HIGH, SMS for CRITICAL.
    pub fn channels(&self) -> Vec<&'static str> {
        let mut channels = vec!["dashboard"];
        if matches!(self, Self::High | Self::Critical) {
            channels.push("mobile_push");
        }
        if *self == Self::Critical {
            channels.push("sms");
        }
        channels
    }

    /// Approval SLA in minutes.
    pub fn sla_minutes(&self) -> u32 {
        match self {
            Self::Critical => 5,
            Self::High => 15,
            Self::Medium => 30,
            Self::Low => 60,
        }
    }
}
