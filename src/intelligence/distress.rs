use std::collections::BTreeSet;

use super::keywords::{
    matched_phrases, HIGH_DISTRESS_PATTERNS, LOW_DISTRESS_PATTERNS, MEDIUM_DISTRESS_PATTERNS,
};
use crate::models::enums::DistressLevel;
use crate::models::DistressSignal;

/// Similar recent requests at which distress is raised to at least MEDIUM.
pub const REPETITION_DISTRESS_THRESHOLD: u32 = 2;

pub const REPEATED_REQUEST_INDICATOR: &str = "repeated_request";

/// Heuristic distress scoring from phrase tables and repetition.
#[derive(Debug, Default, Clone, Copy)]
pub struct DistressDetector;

impl DistressDetector {
    /// Score one query. `repetition_count` is the number of similar requests
    /// already in the recent window.
    pub fn detect(&self, text: &str, repetition_count: u32) -> DistressSignal {
        let mut level = DistressLevel::None;
        let mut indicators = BTreeSet::new();

        for (patterns, tier) in [
            (&*HIGH_DISTRESS_PATTERNS, DistressLevel::High),
            (&*MEDIUM_DISTRESS_PATTERNS, DistressLevel::Medium),
            (&*LOW_DISTRESS_PATTERNS, DistressLevel::Low),
        ] {
            let hits = matched_phrases(patterns, text);
            if !hits.is_empty() {
                level = level.max(tier);
                indicators.extend(hits);
            }
        }

        if repetition_count >= REPETITION_DISTRESS_THRESHOLD {
            level = level.max(DistressLevel::Medium);
            indicators.insert(REPEATED_REQUEST_INDICATOR.to_string());
        }

        DistressSignal {
            level,
            indicators,
            repetition_count,
        }
    }
}
