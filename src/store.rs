//! Authoritative in-memory employee and attendance collections.
//!
//! All mutations run under a single write lock for the whole
//! check, persist, apply sequence. The in-memory change is applied only after
//! the optional [`Persistence`] backend accepted it, so a failed write leaves
//! nothing behind.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::aggregation::AggregationEngine;
use crate::error::StoreError;
use crate::model::attendance::{AttendanceFilter, AttendanceRecord, AttendanceStatus, MarkOutcome};
use crate::model::dashboard::DashboardSummary;
use crate::model::employee::{Employee, NewEmployee};
use crate::utils::validation::required;

/// Everything a persistence backend hands back on startup.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub employees: Vec<Employee>,
    pub attendance: Vec<AttendanceRecord>,
    /// Lowest attendance id never handed out; 0 when the backend keeps none.
    pub next_attendance_id: u64,
}

/// Durable storage behind the store.
#[async_trait]
pub trait Persistence: Send + Sync {
    async fn load(&self) -> anyhow::Result<Snapshot>;

    async fn insert_employee(&self, employee: &Employee) -> anyhow::Result<()>;

    /// Must remove the employee's attendance in the same transaction.
    async fn delete_employee(&self, employee_id: &str) -> anyhow::Result<()>;

    /// Insert, or overwrite the status of the row with the same
    /// (employee_id, date).
    /// Also raises the stored `next_attendance_id` past `record.id`.
    async fn save_attendance(&self, record: &AttendanceRecord) -> anyhow::Result<()>;

    async fn delete_attendance(&self, id: u64) -> anyhow::Result<()>;
}

type AttendanceKey = (String, NaiveDate);

/// The two collections plus the (employee_id, date) index.
#[derive(Debug)]
pub struct Dataset {
    employees: HashMap<String, Employee>,
    records: BTreeMap<u64, AttendanceRecord>,
    by_key: HashMap<AttendanceKey, u64>,
    next_id: u64,
}

impl Default for Dataset {
    fn default() -> Self {
        Self {
            employees: HashMap::new(),
            records: BTreeMap::new(),
            by_key: HashMap::new(),
            next_id: 1,
        }
    }
}

impl Dataset {
    /// Builds a dataset without checking foreign keys.
    pub(crate) fn from_parts(employees: Vec<Employee>, records: Vec<AttendanceRecord>) -> Self {
        let mut data = Dataset::default();
        for employee in employees {
            data.employees.insert(employee.employee_id.clone(), employee);
        }
        for record in records {
            data.next_id = data.next_id.max(record.id + 1);
            data.by_key
                .insert((record.employee_id.clone(), record.date), record.id);
            data.records.insert(record.id, record);
        }
        data
    }

    pub fn employees(&self) -> impl Iterator<Item = &Employee> {
        self.employees.values()
    }

    pub fn records(&self) -> impl Iterator<Item = &AttendanceRecord> {
        self.records.values()
    }

    pub fn has_employee(&self, employee_id: &str) -> bool {
        self.employees.contains_key(employee_id)
    }

    pub fn employee_count(&self) -> usize {
        self.employees.len()
    }

    fn record_for(&self, employee_id: &str, date: NaiveDate) -> Option<&AttendanceRecord> {
        self.by_key
            .get(&(employee_id.to_string(), date))
            .and_then(|id| self.records.get(id))
    }

    fn put_record(&mut self, record: AttendanceRecord) {
        self.by_key
            .insert((record.employee_id.clone(), record.date), record.id);
        self.records.insert(record.id, record);
    }

    fn remove_employee_cascade(&mut self, employee_id: &str) -> usize {
        self.employees.remove(employee_id);
        let before = self.records.len();
        self.records.retain(|_, r| r.employee_id != employee_id);
        self.by_key.retain(|(emp, _), _| emp != employee_id);
        before - self.records.len()
    }
}

pub struct AttendanceStore {
    data: RwLock<Dataset>,
    persistence: Option<Arc<dyn Persistence>>,
}

impl AttendanceStore {
    /// A store with no durable backend.
    pub fn in_memory() -> Self {
        Self {
            data: RwLock::new(Dataset::default()),
            persistence: None,
        }
    }

    /// Seeds the store from the backend's snapshot and writes through to it
    /// afterwards. Attendance rows pointing at unknown employees are dropped.
    /// Ids continue from the backend's high-water mark, so an id deleted
    /// before a restart is not reused.
    pub async fn load(persistence: Arc<dyn Persistence>) -> anyhow::Result<Self> {
        let Snapshot {
            employees,
            attendance,
            next_attendance_id,
        } = persistence.load().await?;

        let known: std::collections::HashSet<&str> =
            employees.iter().map(|e| e.employee_id.as_str()).collect();
        let (records, orphans): (Vec<_>, Vec<_>) = attendance
            .into_iter()
            .partition(|r| known.contains(r.employee_id.as_str()));
        if !orphans.is_empty() {
            warn!(count = orphans.len(), "Skipping attendance rows with unknown employee");
        }

        let mut data = Dataset::from_parts(employees, records);
        data.next_id = data.next_id.max(next_attendance_id);
        info!(
            employees = data.employees.len(),
            attendance = data.records.len(),
            next_id = data.next_id,
            "Store loaded from persistence"
        );

        Ok(Self {
            data: RwLock::new(data),
            persistence: Some(persistence),
        })
    }

    pub async fn add_employee(&self, candidate: NewEmployee) -> Result<Employee, StoreError> {
        let candidate = candidate.validate()?;

        let mut data = self.data.write().await;
        if data.has_employee(&candidate.employee_id) {
            return Err(StoreError::conflict(format!(
                "Employee ID '{}' already exists",
                candidate.employee_id
            )));
        }
        if data
            .employees()
            .any(|e| e.email.eq_ignore_ascii_case(&candidate.email))
        {
            return Err(StoreError::conflict(format!(
                "Email '{}' already in use",
                candidate.email
            )));
        }

        // Microsecond precision survives a round trip through the database.
        let employee = candidate.into_employee(now());
        if let Some(persistence) = &self.persistence {
            persistence
                .insert_employee(&employee)
                .await
                .map_err(StoreError::Persistence)?;
        }
        data.employees
            .insert(employee.employee_id.clone(), employee.clone());

        debug!(employee_id = %employee.employee_id, "Employee added");
        Ok(employee)
    }

    /// Removes the employee together with all of their attendance.
    pub async fn delete_employee(&self, employee_id: &str) -> Result<(), StoreError> {
        let employee_id = employee_id.trim();

        let mut data = self.data.write().await;
        if !data.has_employee(employee_id) {
            return Err(StoreError::not_found("Employee not found"));
        }
        if let Some(persistence) = &self.persistence {
            persistence
                .delete_employee(employee_id)
                .await
                .map_err(StoreError::Persistence)?;
        }
        let removed = data.remove_employee_cascade(employee_id);

        debug!(employee_id, removed_attendance = removed, "Employee deleted");
        Ok(())
    }

    pub async fn list_employees(&self) -> Vec<Employee> {
        let data = self.data.read().await;
        let mut employees: Vec<Employee> = data.employees().cloned().collect();
        employees.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.employee_id.cmp(&b.employee_id))
        });
        employees
    }

    pub async fn get_employee(&self, employee_id: &str) -> Result<Employee, StoreError> {
        let data = self.data.read().await;
        data.employees
            .get(employee_id.trim())
            .cloned()
            .ok_or_else(|| StoreError::not_found("Employee not found"))
    }

    /// Upsert keyed on (employee_id, date). The lookup and the write happen
    /// under one write lock, so concurrent marks for the same pair converge
    /// on a single record.
    pub async fn mark_attendance(
        &self,
        employee_id: &str,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<MarkOutcome, StoreError> {
        let employee_id = required("employee_id", employee_id)?;

        let mut data = self.data.write().await;
        if !data.has_employee(&employee_id) {
            return Err(StoreError::not_found(format!(
                "Employee '{employee_id}' not found"
            )));
        }

        let outcome = match data.record_for(&employee_id, date) {
            Some(existing) => MarkOutcome::Updated(AttendanceRecord {
                status,
                ..existing.clone()
            }),
            None => MarkOutcome::Created(AttendanceRecord {
                id: data.next_id,
                employee_id,
                date,
                status,
                created_at: now(),
            }),
        };

        if let Some(persistence) = &self.persistence {
            persistence
                .save_attendance(outcome.record())
                .await
                .map_err(StoreError::Persistence)?;
        }
        if outcome.is_created() {
            data.next_id += 1;
        }
        data.put_record(outcome.record().clone());

        debug!(
            id = outcome.record().id,
            employee_id = %outcome.record().employee_id,
            %date,
            %status,
            created = outcome.is_created(),
            "Attendance marked"
        );
        Ok(outcome)
    }

    pub async fn delete_attendance(&self, id: u64) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        let Some(record) = data.records.get(&id) else {
            return Err(StoreError::not_found("Attendance record not found"));
        };
        let key = (record.employee_id.clone(), record.date);

        if let Some(persistence) = &self.persistence {
            persistence
                .delete_attendance(id)
                .await
                .map_err(StoreError::Persistence)?;
        }
        data.records.remove(&id);
        data.by_key.remove(&key);

        debug!(id, "Attendance deleted");
        Ok(())
    }

    /// Matching records, newest date first and by id within a date.
    pub async fn query_attendance(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        if let (Some(from), Some(to)) = (filter.date_from, filter.date_to) {
            if from > to {
                return Err(StoreError::validation(
                    "date_from",
                    "date_from must not be after date_to",
                ));
            }
        }

        let data = self.data.read().await;
        let mut records: Vec<AttendanceRecord> = data
            .records()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    pub async fn dashboard(&self, today: NaiveDate) -> DashboardSummary {
        let data = self.data.read().await;
        AggregationEngine::new(&data).summarize(today)
    }
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
