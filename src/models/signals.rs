use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::enums::{ClassificationSource, DistressLevel, Intent};

/// Intent classification for one query. Produced once, consumed read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub intent: Intent,
    /// Confidence in [0, 1].
    pub confidence: f32,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
    pub source: ClassificationSource,
}

impl ClassificationResult {
    pub fn new(intent: Intent, confidence: f32, source: ClassificationSource) -> Self {
        Self {
            intent,
            confidence: confidence.clamp(0.0, 1.0),
            matched_keywords: Vec::new(),
            source,
        }
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.matched_keywords = keywords;
        self
    }
}

/// Urgency/emotional-state indicator derived from text and recent history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistressSignal {
    pub level: DistressLevel,
    pub indicators: BTreeSet<String>,
    /// Similar requests seen in the bounded recent window.
    pub repetition_count: u32,
}

impl DistressSignal {
    pub fn calm() -> Self {
        Self {
            level: DistressLevel::None,
            indicators: BTreeSet::new(),
            repetition_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_clamped() {
        let result = ClassificationResult::new(Intent::Medical, 1.7, ClassificationSource::Llm);
        assert_eq!(result.confidence, 1.0);
        let result = ClassificationResult::new(Intent::Medical, -0.2, ClassificationSource::Llm);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn calm_signal_has_no_indicators() {
        let signal = DistressSignal::calm();
        assert_eq!(signal.level, DistressLevel::None);
        assert!(signal.indicators.is_empty());
        assert_eq!(signal.repetition_count, 0);
    }
}
