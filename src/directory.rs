//! The employee directory seam.
//!
//! The payroll engine validates employee references against a
//! directory it does not own.  [`EmployeeDirectory`] is the capability
//! an embedding application implements over its own storage; tests and
//! the CLI use [`InMemoryEmployeeDirectory`].  Directories must be
//! thread-safe (`Send + Sync`) because the batch engine consults them
//! from multiple worker threads.

use crate::models::Employee;
use std::collections::HashMap;

/// Read-only lookup of employee master data.
pub trait EmployeeDirectory: Send + Sync {
    /// Returns the employee with the given id, if any.
    fn find(&self, id: &str) -> Option<Employee>;

    /// Returns every employee known to the directory.
    fn all(&self) -> Vec<Employee>;
}

/// A directory backed by a plain map, for tests and the CLI.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEmployeeDirectory {
    employees: HashMap<String, Employee>,
}

impl InMemoryEmployeeDirectory {
    /// Builds a directory from a list of employees.  Later duplicates
    /// of an id replace earlier ones.
    pub fn new(employees: impl IntoIterator<Item = Employee>) -> Self {
        InMemoryEmployeeDirectory {
            employees: employees
                .into_iter()
                .map(|employee| (employee.id.clone(), employee))
                .collect(),
        }
    }
}

impl EmployeeDirectory for InMemoryEmployeeDirectory {
    fn find(&self, id: &str) -> Option<Employee> {
        self.employees.get(id).cloned()
    }

    fn all(&self) -> Vec<Employee> {
        self.employees.values().cloned().collect()
    }
}
