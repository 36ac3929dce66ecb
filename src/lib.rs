//! Payroll Engine library crate.
//!
//! This crate exposes the core payroll computation components as
//! reusable modules.  External applications may depend on the
//! `payroll_engine` crate and call into [`calculator::compute_deductions`]
//! for a single employee, [`engine::run_payroll`] for a whole batch, or
//! [`report::aggregate`] and [`report::generate_report`] to roll results
//! up into department summaries and persistable report records.
//!
//! The deduction policy (tax brackets plus mandatory contribution
//! rules) is plain data supplied by the caller, never ambient state, so
//! concurrent calculations against different policy snapshots are safe
//! and reproducible.

pub mod calculator;
pub mod directory;
pub mod engine;
pub mod error;
pub mod logging;
pub mod models;
pub mod report;
pub mod tax;

pub use calculator::compute_deductions;
pub use directory::{EmployeeDirectory, InMemoryEmployeeDirectory};
pub use error::{PayrollError, PayrollResult};
pub use tax::{BracketTable, ContributionRule, DeductionPolicy, TaxBracket};
