pub mod alerts;
pub mod approvals;
pub mod audit;
pub mod health;
pub mod interactions;
pub mod notifications;
pub mod patients;
pub mod policy;
pub mod query;
