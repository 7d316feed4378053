use std::sync::LazyLock;

use regex::Regex;

/// A compiled phrase matcher. Case-insensitive, anchored on word boundaries.
pub(crate) struct KeywordPattern {
    regex: Regex,
    phrase: &'static str,
}

impl KeywordPattern {
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn phrase(&self) -> &'static str {
        self.phrase
    }
}

fn compile(phrases: &[&'static str]) -> Vec<KeywordPattern> {
    phrases
        .iter()
        .map(|&phrase| KeywordPattern {
            regex: Regex::new(&format!(r"(?i)\b{}\b", regex::escape(phrase)))
                .expect("Invalid keyword regex pattern"),
            phrase,
        })
        .collect()
}

/// Phrases from `patterns` that occur in `text`, in table order.
pub(crate) fn matched_phrases(patterns: &[KeywordPattern], text: &str) -> Vec<String> {
    patterns
        .iter()
        .filter(|p| p.is_match(text))
        .map(|p| p.phrase().to_string())
        .collect()
}

// ── Intent ──────────────────────────────────────────────────

pub(crate) static EMERGENCY_PATTERNS: LazyLock<Vec<KeywordPattern>> = LazyLock::new(|| {
    compile(&[
        "chest pain",
        "can't breathe",
        "cannot breathe",
        "can not breathe",
        "trouble breathing",
        "severe bleeding",
        "bleeding heavily",
        "unconscious",
        "passed out",
        "heart attack",
        "stroke",
        "seizure",
        "choking",
        "severe pain",
        "dying",
    ])
});

pub(crate) static MEDICAL_PATTERNS: LazyLock<Vec<KeywordPattern>> = LazyLock::new(|| {
    compile(&[
        "pain",
        "hurt",
        "hurts",
        "ache",
        "headache",
        "medication",
        "medicine",
        "pill",
        "pills",
        "painkiller",
        "doctor",
        "nurse",
        "sick",
        "nausea",
        "nauseous",
        "vomit",
        "dizzy",
        "fever",
        "symptom",
        "symptoms",
        "treatment",
        "injection",
        "iv",
        "blood pressure",
        "bleeding",
        "wound",
    ])
});

pub(crate) static NON_MEDICAL_PATTERNS: LazyLock<Vec<KeywordPattern>> = LazyLock::new(|| {
    compile(&[
        "water",
        "temperature",
        "cold",
        "warm",
        "tv",
        "television",
        "remote",
        "channel",
        "light",
        "lights",
        "blanket",
        "pillow",
        "room",
        "visitor",
        "visitors",
        "visiting hours",
        "time",
        "date",
        "weather",
        "bathroom",
        "toilet",
        "window",
        "curtain",
        "food",
        "meal",
    ])
});

// ── Distress ────────────────────────────────────────────────

pub(crate) static HIGH_DISTRESS_PATTERNS: LazyLock<Vec<KeywordPattern>> = LazyLock::new(|| {
    compile(&[
        "unbearable",
        "can't take it",
        "getting worse",
        "emergency",
        "severe",
        "chest pain",
        "can't breathe",
        "cannot breathe",
        "dying",
    ])
});

pub(crate) static MEDIUM_DISTRESS_PATTERNS: LazyLock<Vec<KeywordPattern>> = LazyLock::new(|| {
    compile(&[
        "help",
        "dizzy",
        "panic",
        "panicking",
        "scared",
        "afraid",
        "anxious",
        "urgent",
        "worse",
    ])
});

pub(crate) static LOW_DISTRESS_PATTERNS: LazyLock<Vec<KeywordPattern>> = LazyLock::new(|| {
    compile(&[
        "uncomfortable",
        "please",
        "need",
        "soon",
        "waiting",
        "still",
        "again",
        "repeatedly",
    ])
});

// ── Medication ──────────────────────────────────────────────

pub(crate) static MEDICATION_PATTERNS: LazyLock<Vec<KeywordPattern>> = LazyLock::new(|| {
    compile(&[
        "medication",
        "medications",
        "medicine",
        "meds",
        "pill",
        "pills",
        "tablet",
        "tablets",
        "painkiller",
        "painkillers",
        "dose",
        "dosage",
        "prescription",
        "insulin",
        "antibiotic",
        "antibiotics",
        "ibuprofen",
        "acetaminophen",
        "paracetamol",
        "tylenol",
        "aspirin",
        "morphine",
    ])
});
