pub mod audit;
pub mod decision;
pub mod enums;
pub mod patient;
pub mod records;
pub mod signals;

pub use audit::*;
pub use decision::*;
pub use patient::*;
pub use records::*;
pub use signals::*;
