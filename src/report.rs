//! Department aggregation and report generation.
//!
//! [`aggregate`] rolls a set of payroll records up into per-department
//! summaries; [`generate_report`] freezes a summary into a persistable
//! [`ReportRecord`] for a stated reporting period.  Both are pure
//! transformations — storage of the resulting records belongs to an
//! external collaborator, as does any document (PDF) rendering.

use crate::directory::EmployeeDirectory;
use crate::error::{PayrollError, PayrollResult};
use crate::models::{PayrollRecord, PayrollSummary, ReportRecord, ReportType};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

/// Groups payroll records by department and computes count, net-pay
/// total and arithmetic mean for each group.
///
/// An empty input produces an empty summary set.  Departments with no
/// matching records are simply absent from the output — there are no
/// zero-valued rows, so the average is never a division by zero.
/// Summaries are returned sorted by department name so that repeated
/// aggregations over the same records are identical.
///
/// # Errors
///
/// Returns [`PayrollError::EmployeeNotFound`] when a record references
/// an employee the directory does not know; the department of such a
/// record cannot be determined.
pub fn aggregate(
    records: &[PayrollRecord],
    directory: &dyn EmployeeDirectory,
) -> PayrollResult<Vec<PayrollSummary>> {
    // BTreeMap keeps the department ordering deterministic.
    let mut groups: BTreeMap<String, (u64, Decimal)> = BTreeMap::new();
    for record in records {
        let employee = directory
            .find(&record.employee_id)
            .ok_or_else(|| PayrollError::EmployeeNotFound(record.employee_id.clone()))?;
        let entry = groups.entry(employee.department).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += record.net_pay;
    }

    let summaries = groups
        .into_iter()
        .map(|(department, (count, total))| PayrollSummary {
            department,
            total_employees: count,
            total_payroll: total,
            average_pay: (total / Decimal::from(count)).round_dp(2),
        })
        .collect::<Vec<_>>();
    debug!(records = records.len(), departments = summaries.len(), "aggregated payroll");
    Ok(summaries)
}

/// Freezes one department summary into a report record for the stated
/// period.
///
/// The record id is derived from the report type, department and
/// period boundaries, so generating the same report twice describes
/// the same record.
///
/// # Errors
///
/// Returns [`PayrollError::InvalidInput`] when `start_date` is after
/// `end_date`.
pub fn generate_report(
    summary: &PayrollSummary,
    start_date: NaiveDate,
    end_date: NaiveDate,
    report_type: ReportType,
) -> PayrollResult<ReportRecord> {
    if start_date > end_date {
        return Err(PayrollError::InvalidInput(format!(
            "report period starts at {start_date} but ends at {end_date}"
        )));
    }
    Ok(ReportRecord {
        id: format!("{report_type}/{}/{start_date}..{end_date}", summary.department),
        report_type,
        start_date,
        end_date,
        department: summary.department.clone(),
        total_payroll: summary.total_payroll,
        total_employees: summary.total_employees,
        average_pay: summary.average_pay,
    })
}

/// Generates one report record per summary for a shared period.
pub fn generate_reports(
    summaries: &[PayrollSummary],
    start_date: NaiveDate,
    end_date: NaiveDate,
    report_type: ReportType,
) -> PayrollResult<Vec<ReportRecord>> {
    summaries
        .iter()
        .map(|summary| generate_report(summary, start_date, end_date, report_type))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryEmployeeDirectory;
    use crate::models::{Employee, PayPeriod};
    use rust_decimal_macros::dec;

    fn employee(id: &str, department: &str) -> Employee {
        Employee {
            id: id.to_string(),
            name: format!("Employee {id}"),
            department: department.to_string(),
            position: "Staff".to_string(),
        }
    }

    fn record(employee_id: &str, net_pay: Decimal) -> PayrollRecord {
        let period = PayPeriod::parse("2024-01").unwrap();
        PayrollRecord {
            id: format!("{period}/{employee_id}"),
            employee_id: employee_id.to_string(),
            basic_pay: net_pay + dec!(1000),
            deductions: dec!(1000),
            net_pay,
            pay_period: period,
        }
    }

    #[test]
    fn empty_input_aggregates_to_an_empty_set() {
        let directory = InMemoryEmployeeDirectory::new([]);
        assert_eq!(aggregate(&[], &directory).unwrap(), vec![]);
    }

    #[test]
    fn ten_it_employees_average_fifty_thousand() {
        let employees: Vec<_> = (1..=10).map(|i| employee(&i.to_string(), "IT")).collect();
        let directory = InMemoryEmployeeDirectory::new(employees);
        let records: Vec<_> = (1..=10)
            .map(|i| record(&i.to_string(), dec!(50000)))
            .collect();

        let summaries = aggregate(&records, &directory).unwrap();
        assert_eq!(summaries.len(), 1);
        let it = &summaries[0];
        assert_eq!(it.department, "IT");
        assert_eq!(it.total_employees, 10);
        assert_eq!(it.total_payroll, dec!(500000));
        assert_eq!(it.average_pay, dec!(50000));
    }

    #[test]
    fn groups_by_department_and_sorts_output() {
        let directory = InMemoryEmployeeDirectory::new([
            employee("1", "IT"),
            employee("2", "HR"),
            employee("3", "IT"),
        ]);
        let records = vec![
            record("1", dec!(40000)),
            record("2", dec!(30000)),
            record("3", dec!(50000)),
        ];

        let summaries = aggregate(&records, &directory).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].department, "HR");
        assert_eq!(summaries[0].total_employees, 1);
        assert_eq!(summaries[0].average_pay, dec!(30000));
        assert_eq!(summaries[1].department, "IT");
        assert_eq!(summaries[1].total_payroll, dec!(90000));
        assert_eq!(summaries[1].average_pay, dec!(45000));
    }

    #[test]
    fn record_for_unknown_employee_fails_aggregation() {
        let directory = InMemoryEmployeeDirectory::new([employee("1", "IT")]);
        let records = vec![record("1", dec!(40000)), record("99", dec!(30000))];
        assert!(matches!(
            aggregate(&records, &directory),
            Err(PayrollError::EmployeeNotFound(id)) if id == "99"
        ));
    }

    #[test]
    fn report_record_snapshots_the_summary() {
        let summary = PayrollSummary {
            department: "IT".into(),
            total_employees: 10,
            total_payroll: dec!(500000),
            average_pay: dec!(50000),
        };
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();

        let report = generate_report(&summary, start, end, ReportType::Monthly).unwrap();
        assert_eq!(report.id, "monthly/IT/2024-01-01..2024-01-31");
        assert_eq!(report.report_type, ReportType::Monthly);
        assert_eq!(report.department, "IT");
        assert_eq!(report.total_payroll, dec!(500000));
        assert_eq!(report.total_employees, 10);
        assert_eq!(report.average_pay, dec!(50000));
    }

    #[test]
    fn inverted_report_period_is_rejected() {
        let summary = PayrollSummary {
            department: "IT".into(),
            total_employees: 1,
            total_payroll: dec!(1),
            average_pay: dec!(1),
        };
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(matches!(
            generate_report(&summary, start, end, ReportType::Monthly),
            Err(PayrollError::InvalidInput(_))
        ));
    }

    #[test]
    fn one_report_per_summary() {
        let summaries = vec![
            PayrollSummary {
                department: "HR".into(),
                total_employees: 2,
                total_payroll: dec!(60000),
                average_pay: dec!(30000),
            },
            PayrollSummary {
                department: "IT".into(),
                total_employees: 3,
                total_payroll: dec!(150000),
                average_pay: dec!(50000),
            },
        ];
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();

        let reports = generate_reports(&summaries, start, end, ReportType::Quarterly).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.report_type == ReportType::Quarterly));
    }
}
