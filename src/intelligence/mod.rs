//! Signal extraction for patient queries: intent, distress, repetition and
//! medication detection. Heuristic, with an optional LLM for intent.

pub mod classifier;
pub mod distress;
mod keywords;
pub mod medication;
pub mod repetition;

pub use classifier::{
    ClassifierError, HybridClassifier, IntentClassifier, KeywordClassifier, LlmClassifier,
};
pub use distress::DistressDetector;
pub use medication::is_medication_request;
pub use repetition::count_similar;
