//! Data models for the Payroll Engine.
//!
//! The `models` module defines a set of serialisable structs and enums
//! representing employees, pay periods, deduction results, payroll
//! records and report records.  These data types derive `Serialize`
//! and `Deserialize` so that they can be easily persisted or
//! transmitted over a network, but they are plain data structures with
//! no framework-specific types: serialization to storage or to an API
//! response is the responsibility of external collaborators.

use crate::error::PayrollError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents an employee as known to the employee directory.
///
/// The payroll engine never stores employees itself; it only reads
/// them through the [`crate::directory::EmployeeDirectory`] seam.  The
/// `department` field drives aggregation into [`PayrollSummary`] rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// A unique identifier for the employee.  This could be a numeric
    /// key rendered as a string or any unique code used by your
    /// organisation.
    pub id: String,
    /// The employee's full name.
    pub name: String,
    /// The department the employee belongs to, e.g. `"IT"`.
    pub department: String,
    /// The employee's position or job title.
    pub position: String,
}

/// A calendar month pay period, written `"YYYY-MM"`.
///
/// Construction validates the format, so a `PayPeriod` held anywhere in
/// the crate is always well formed.  Malformed input is rejected with
/// [`PayrollError::InvalidInput`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PayPeriod {
    year: i32,
    month: u32,
}

impl PayPeriod {
    /// Parses a `"YYYY-MM"` string into a pay period.
    pub fn parse(s: &str) -> Result<Self, PayrollError> {
        let malformed = || PayrollError::InvalidInput(format!("malformed pay period: {s:?}"));
        let (y, m) = s.split_once('-').ok_or_else(malformed)?;
        if y.len() != 4 || m.len() != 2 || !y.chars().chain(m.chars()).all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }
        let year: i32 = y.parse().map_err(|_| malformed())?;
        let month: u32 = m.parse().map_err(|_| malformed())?;
        if !(1..=12).contains(&month) {
            return Err(malformed());
        }
        Ok(PayPeriod { year, month })
    }

    /// The calendar year of the period.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The calendar month of the period (1..=12).
    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl TryFrom<String> for PayPeriod {
    type Error = PayrollError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PayPeriod::parse(&value)
    }
}

impl From<PayPeriod> for String {
    fn from(value: PayPeriod) -> Self {
        value.to_string()
    }
}

/// The itemized result of a deduction calculation for one employee.
///
/// Invariant: `net_pay = basic_pay - (tax + social_insurance +
/// health_insurance + housing_fund)` and every component is
/// non-negative.  The calculator upholds this for all valid inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionResult {
    /// The employee this calculation applies to.
    pub employee_id: String,
    /// Gross pay for the period, before any deductions.
    pub basic_pay: Decimal,
    /// Income tax withheld, from the bracket table.
    pub tax: Decimal,
    /// Social insurance contribution (SSS in the Philippine schedule).
    pub social_insurance: Decimal,
    /// Health insurance contribution (PhilHealth).
    pub health_insurance: Decimal,
    /// Housing fund contribution (Pag-IBIG).
    pub housing_fund: Decimal,
    /// Pay remaining after all deductions.
    pub net_pay: Decimal,
}

impl DeductionResult {
    /// Sum of all deduction components.
    pub fn total_deductions(&self) -> Decimal {
        self.tax + self.social_insurance + self.health_insurance + self.housing_fund
    }
}

/// A payroll record issued for one employee in one pay period.
///
/// Records are immutable once issued; a correction produces a new
/// record rather than mutating an existing one.  The `deductions`
/// field carries the aggregate of the itemized components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// Deterministic record identifier, `"{period}/{employee_id}"`.
    pub id: String,
    /// The employee the record was issued for.
    pub employee_id: String,
    /// Gross pay for the period.
    pub basic_pay: Decimal,
    /// Total deductions withheld.
    pub deductions: Decimal,
    /// Pay remaining after deductions.
    pub net_pay: Decimal,
    /// The period the record covers.
    pub pay_period: PayPeriod,
}

/// A read-only aggregate over a set of payroll records for one
/// department.  Summaries are recomputed on demand and never persisted
/// as a source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollSummary {
    /// The department the summary covers.
    pub department: String,
    /// Number of payroll records in the group.
    pub total_employees: u64,
    /// Sum of net pay across the group.
    pub total_payroll: Decimal,
    /// Arithmetic mean of net pay across the group.
    pub average_pay: Decimal,
}

/// The kind of period a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Monthly,
    Quarterly,
    Annual,
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportType::Monthly => write!(f, "monthly"),
            ReportType::Quarterly => write!(f, "quarterly"),
            ReportType::Annual => write!(f, "annual"),
        }
    }
}

/// A persisted snapshot of a [`PayrollSummary`] for a stated period.
///
/// Report records are created by the report generator and read-only
/// thereafter.  Storing them is an external collaborator's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    /// Deterministic report identifier derived from type, department
    /// and period boundaries.
    pub id: String,
    /// The kind of period the report covers.
    pub report_type: ReportType,
    /// Inclusive start date of the reporting period.
    pub start_date: NaiveDate,
    /// Inclusive end date of the reporting period.
    pub end_date: NaiveDate,
    /// The department the report covers.
    pub department: String,
    /// Sum of net pay across the department for the period.
    pub total_payroll: Decimal,
    /// Number of payroll records included.
    pub total_employees: u64,
    /// Arithmetic mean of net pay.
    pub average_pay: Decimal,
}

/// One entry in a batch pay run: who to pay and their gross pay for
/// the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayRequest {
    /// The employee to be paid.
    pub employee_id: String,
    /// Gross pay for the period.
    pub basic_pay: Decimal,
}

/// Input to the payroll engine.
///
/// A `PayRunInput` contains the pay period to be processed and one
/// [`PayRequest`] per employee in the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayRunInput {
    /// The period over which payment is being calculated.
    pub pay_period: PayPeriod,
    /// The employees to be paid in this run.
    pub requests: Vec<PayRequest>,
}

/// The aggregate result of a payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayRunResult {
    /// The pay period that was processed.
    pub pay_period: PayPeriod,
    /// One issued record per employee in the batch.
    pub records: Vec<PayrollRecord>,
}
