//! Core engine for a membership-society back office: monthly contribution
//! payments, loans with EMI repayment schedules, and the treasury ledger the
//! two feed, behind a staff/admin access gate.

pub mod auth;
pub mod effective;
pub mod emi;
pub mod error;
pub mod ledger;
pub mod loan;
pub mod payment;
pub mod service;
pub mod store;
pub mod types;

pub use error::SocietyError;
pub use types::{round_money, Money, Rate};

/// Standard result type for all society operations.
pub type SocietyResult<T> = Result<T, SocietyError>;
