pub mod config;
pub mod emi;
pub mod ledger;
pub mod loan;
pub mod payment;
