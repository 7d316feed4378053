//! Policy evaluation: maps classified signals to an escalation decision.
//!
//! Pure and synchronous. The only side effect is a debug log of the rule
//! that matched.

mod evaluator;
mod rules;

pub use evaluator::{evaluate, PolicyError, PolicyInput};
pub use rules::REPEATED_REQUEST_THRESHOLD;
