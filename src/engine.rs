//! Payroll record building and batch pay runs.
//!
//! The `engine` module is responsible for turning a [`PayRunInput`]
//! into a [`PayRunResult`].  It uses the [`rayon`] crate to
//! parallelise per-employee calculations across multiple CPU cores;
//! this is safe because each calculation is a pure function over its
//! own input and the shared policy snapshot is immutable for the
//! duration of the run.

use crate::calculator::compute_deductions;
use crate::directory::EmployeeDirectory;
use crate::error::{PayrollError, PayrollResult};
use crate::models::{PayPeriod, PayRunInput, PayRunResult, PayrollRecord};
use crate::tax::DeductionPolicy;
use rayon::prelude::*;
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Builds the payroll record for one employee and period.
///
/// Validates the employee reference against the directory, runs the
/// deduction calculator, and composes the result with identity and
/// period metadata.  Record ids are deterministic
/// (`"{period}/{employee_id}"`): re-running the same period for the
/// same employee describes the same record, and a correction is issued
/// as a new record for a new period rather than a mutation.
///
/// # Errors
///
/// Returns [`PayrollError::EmployeeNotFound`] when the directory has
/// no entry for `employee_id`, and propagates calculator errors.
pub fn build_payroll_record(
    directory: &dyn EmployeeDirectory,
    employee_id: &str,
    basic_pay: Decimal,
    pay_period: &PayPeriod,
    policy: &DeductionPolicy,
) -> PayrollResult<PayrollRecord> {
    let employee = directory
        .find(employee_id)
        .ok_or_else(|| PayrollError::EmployeeNotFound(employee_id.to_string()))?;

    let result = compute_deductions(&employee.id, basic_pay, policy)?;
    debug!(
        employee_id = %employee.id,
        period = %pay_period,
        net_pay = %result.net_pay,
        "payroll record built"
    );

    Ok(PayrollRecord {
        id: format!("{pay_period}/{employee_id}"),
        employee_id: employee.id,
        basic_pay: result.basic_pay,
        deductions: result.total_deductions(),
        net_pay: result.net_pay,
        pay_period: pay_period.clone(),
    })
}

/// Runs a payroll batch for a given input, directory and policy.
///
/// Each request is computed independently in parallel.  The first
/// error aborts the run: a batch with an unknown employee or a
/// negative pay amount issues no records at all.
pub fn run_payroll(
    input: PayRunInput,
    directory: &dyn EmployeeDirectory,
    policy: &DeductionPolicy,
) -> PayrollResult<PayRunResult> {
    let period = input.pay_period.clone();
    info!(period = %period, requests = input.requests.len(), "starting pay run");

    let records: Vec<PayrollRecord> = input
        .requests
        .into_par_iter()
        .map(|request| {
            build_payroll_record(
                directory,
                &request.employee_id,
                request.basic_pay,
                &period,
                policy,
            )
        })
        .collect::<PayrollResult<_>>()?;

    info!(period = %period, records = records.len(), "pay run complete");
    Ok(PayRunResult {
        pay_period: period,
        records,
    })
}
