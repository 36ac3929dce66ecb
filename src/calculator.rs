//! The deduction calculator.
//!
//! [`compute_deductions`] is the heart of the crate: a pure function
//! from gross pay and a [`DeductionPolicy`] to an itemized
//! [`DeductionResult`].  It performs no I/O, keeps no state, and is
//! deterministic — calling it twice with identical inputs yields
//! bit-identical output — so it may be invoked concurrently without
//! coordination (and the batch engine does exactly that).

use crate::error::{PayrollError, PayrollResult};
use crate::models::DeductionResult;
use crate::tax::DeductionPolicy;
use rust_decimal::Decimal;

/// Computes itemized deductions and net pay for one employee.
///
/// Tax is the containing bracket's rate applied to the whole basic
/// pay; the three mandatory contributions follow their configured
/// [`crate::tax::ContributionRule`].  Zero basic pay yields an
/// all-zero result.
///
/// # Errors
///
/// Returns [`PayrollError::InvalidInput`] when `basic_pay` is
/// negative.  The policy itself cannot be invalid here: bracket
/// tables are validated at construction.
pub fn compute_deductions(
    employee_id: &str,
    basic_pay: Decimal,
    policy: &DeductionPolicy,
) -> PayrollResult<DeductionResult> {
    if basic_pay < Decimal::ZERO {
        return Err(PayrollError::InvalidInput(format!(
            "basic pay must be non-negative, got {basic_pay}"
        )));
    }

    let tax = if basic_pay.is_zero() {
        Decimal::ZERO
    } else {
        let bracket = policy.brackets().bracket_for(basic_pay);
        (basic_pay * bracket.rate).round_dp(2)
    };
    let social_insurance = policy.social_insurance().amount_for(basic_pay);
    let health_insurance = policy.health_insurance().amount_for(basic_pay);
    let housing_fund = policy.housing_fund().amount_for(basic_pay);

    let net_pay = basic_pay - (tax + social_insurance + health_insurance + housing_fund);

    Ok(DeductionResult {
        employee_id: employee_id.to_string(),
        basic_pay,
        tax,
        social_insurance,
        health_insurance,
        housing_fund,
        net_pay,
    })
}
