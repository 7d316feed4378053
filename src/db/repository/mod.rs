//! Repository layer: entity-scoped database operations.
//! All public functions are re-exported here.

mod alert;
mod approval;
mod audit;
mod interaction;
mod notification;
mod patient;

pub use alert::*;
pub use approval::*;
pub use audit::*;
pub use interaction::*;
pub use notification::*;
pub use patient::*;
