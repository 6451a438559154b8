use std::collections::HashMap;

use chrono::NaiveDate;

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::dashboard::{DashboardSummary, DepartmentCount, EmployeePresence};
use crate::store::Dataset;

/// Read-only dashboard metrics over a borrowed [`Dataset`].
///
/// Recomputed on every call. Records whose employee is missing are skipped
/// by every count. Output order of the list-valued metrics is unspecified.
pub struct AggregationEngine<'a> {
    data: &'a Dataset,
}

impl<'a> AggregationEngine<'a> {
    pub fn new(data: &'a Dataset) -> Self {
        Self { data }
    }

    pub fn total_employees(&self) -> usize {
        self.data.employee_count()
    }

    pub fn present_today(&self, today: NaiveDate) -> usize {
        self.count_on(today, AttendanceStatus::Present)
    }

    pub fn absent_today(&self, today: NaiveDate) -> usize {
        self.count_on(today, AttendanceStatus::Absent)
    }

    pub fn department_breakdown(&self) -> Vec<DepartmentCount> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for employee in self.data.employees() {
            *counts.entry(employee.department.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(department, count)| DepartmentCount {
                department: department.to_string(),
                count,
            })
            .collect()
    }

    /// Only employees with at least one Present record appear.
    pub fn present_days_per_employee(&self) -> Vec<EmployeePresence> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in self.live_records() {
            if record.status == AttendanceStatus::Present {
                *counts.entry(record.employee_id.as_str()).or_default() += 1;
            }
        }
        counts
            .into_iter()
            .map(|(employee_id, present_days)| EmployeePresence {
                employee_id: employee_id.to_string(),
                present_days,
            })
            .collect()
    }

    pub fn summarize(&self, today: NaiveDate) -> DashboardSummary {
        DashboardSummary {
            total_employees: self.total_employees(),
            present_today: self.present_today(today),
            absent_today: self.absent_today(today),
            departments: self.department_breakdown(),
            present_days_per_employee: self.present_days_per_employee(),
        }
    }

    fn count_on(&self, day: NaiveDate, status: AttendanceStatus) -> usize {
        self.live_records()
            .filter(|r| r.date == day && r.status == status)
            .count()
    }

    fn live_records(&self) -> impl Iterator<Item = &'a AttendanceRecord> + 'a {
        let data = self.data;
        data.records().filter(move |r| data.has_employee(&r.employee_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::Employee;
    use chrono::Utc;

    fn employee(id: &str, department: &str) -> Employee {
        Employee {
            employee_id: id.to_string(),
            full_name: format!("Employee {id}"),
            email: format!("{}@co.com", id.to_lowercase()),
            department: department.to_string(),
            created_at: Utc::now(),
        }
    }

    fn record(id: u64, employee_id: &str, day: u32, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            id,
            employee_id: employee_id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            status,
            created_at: Utc::now(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    fn sample() -> Dataset {
        use AttendanceStatus::*;
        Dataset::from_parts(
            vec![
                employee("EMP-001", "Engineering"),
                employee("EMP-002", "Engineering"),
                employee("EMP-003", "Sales"),
            ],
            vec![
                record(1, "EMP-001", 1, Present),
                record(2, "EMP-001", 2, Present),
                record(3, "EMP-002", 2, Absent),
                record(4, "EMP-003", 2, Present),
                record(5, "EMP-003", 1, Absent),
            ],
        )
    }

    #[test]
    fn empty_dataset_is_all_zero() {
        let data = Dataset::default();
        let summary = AggregationEngine::new(&data).summarize(today());
        assert_eq!(summary.total_employees, 0);
        assert_eq!(summary.present_today, 0);
        assert_eq!(summary.absent_today, 0);
        assert!(summary.departments.is_empty());
        assert!(summary.present_days_per_employee.is_empty());
    }

    #[test]
    fn counts_today_by_status() {
        let data = sample();
        let engine = AggregationEngine::new(&data);
        assert_eq!(engine.present_today(today()), 2);
        assert_eq!(engine.absent_today(today()), 1);
        let other_day = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        assert_eq!(engine.present_today(other_day), 0);
    }

    #[test]
    fn department_counts_sum_to_total() {
        let data = sample();
        let engine = AggregationEngine::new(&data);
        let mut departments = engine.department_breakdown();
        departments.sort_by(|a, b| a.department.cmp(&b.department));
        assert_eq!(
            departments,
            vec![
                DepartmentCount {
                    department: "Engineering".to_string(),
                    count: 2
                },
                DepartmentCount {
                    department: "Sales".to_string(),
                    count: 1
                },
            ]
        );
        let sum: usize = departments.iter().map(|d| d.count).sum();
        assert_eq!(sum, engine.total_employees());
    }

    #[test]
    fn present_days_omit_zero_counts() {
        let data = sample();
        let mut presence = AggregationEngine::new(&data).present_days_per_employee();
        presence.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
        assert_eq!(
            presence,
            vec![
                EmployeePresence {
                    employee_id: "EMP-001".to_string(),
                    present_days: 2
                },
                EmployeePresence {
                    employee_id: "EMP-003".to_string(),
                    present_days: 1
                },
            ]
        );
        assert!(presence.iter().all(|p| p.present_days > 0));
    }

    #[test]
    fn orphaned_records_are_ignored() {
        let data = Dataset::from_parts(
            vec![employee("EMP-001", "Engineering")],
            vec![
                record(1, "EMP-001", 2, AttendanceStatus::Present),
                record(2, "EMP-GONE", 2, AttendanceStatus::Present),
                record(3, "EMP-GONE", 2, AttendanceStatus::Absent),
            ],
        );
        let summary = AggregationEngine::new(&data).summarize(today());
        assert_eq!(summary.present_today, 1);
        assert_eq!(summary.absent_today, 0);
        assert_eq!(summary.present_days_per_employee.len(), 1);
        assert_eq!(summary.present_days_per_employee[0].employee_id, "EMP-001");
    }
}
