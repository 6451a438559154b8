use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::MySqlPool;
use tracing::{debug, info};

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::employee::Employee;
use crate::store::{Persistence, Snapshot};

pub async fn init_db(database_url: &str) -> anyhow::Result<MySqlPool> {
    MySqlPool::connect(database_url)
        .await
        .context("Failed to connect to database")
}

// employee_id compares byte-wise, like the in-memory map keys.
const CREATE_EMPLOYEES: &str = r#"
    CREATE TABLE IF NOT EXISTS employees (
        employee_id VARCHAR(64)  COLLATE utf8mb4_bin NOT NULL PRIMARY KEY,
        full_name   VARCHAR(255) NOT NULL,
        email       VARCHAR(255) NOT NULL UNIQUE,
        department  VARCHAR(128) NOT NULL,
        created_at  TIMESTAMP(6) NOT NULL
    )
"#;

const CREATE_ATTENDANCE: &str = r#"
    CREATE TABLE IF NOT EXISTS attendance (
        id          BIGINT UNSIGNED NOT NULL PRIMARY KEY,
        employee_id VARCHAR(64)     COLLATE utf8mb4_bin NOT NULL,
        date        DATE            NOT NULL,
        status      ENUM('Present', 'Absent') NOT NULL,
        created_at  TIMESTAMP(6)    NOT NULL,
        UNIQUE KEY uq_attendance_employee_date (employee_id, date),
        CONSTRAINT fk_attendance_employee FOREIGN KEY (employee_id)
            REFERENCES employees (employee_id) ON DELETE CASCADE
    )
"#;

// High-water mark of attendance ids, so deleted ids are not handed out again
// after a restart.
const CREATE_ID_SEQUENCE: &str = r#"
    CREATE TABLE IF NOT EXISTS id_sequence (
        name    VARCHAR(32)     NOT NULL PRIMARY KEY,
        next_id BIGINT UNSIGNED NOT NULL
    )
"#;

const ATTENDANCE_SEQUENCE: &str = "attendance";

/// Creates the tables when they are missing.
pub async fn ensure_schema(pool: &MySqlPool) -> anyhow::Result<()> {
    for ddl in [CREATE_EMPLOYEES, CREATE_ATTENDANCE, CREATE_ID_SEQUENCE] {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .context("Failed to create schema")?;
    }
    info!("Database schema ready");
    Ok(())
}

#[derive(sqlx::FromRow)]
struct AttendanceRow {
    id: u64,
    employee_id: String,
    date: NaiveDate,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = anyhow::Error;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let status: AttendanceStatus = row
            .status
            .parse()
            .with_context(|| format!("Unknown attendance status '{}' in row {}", row.status, row.id))?;
        Ok(AttendanceRecord {
            id: row.id,
            employee_id: row.employee_id,
            date: row.date,
            status,
            created_at: row.created_at,
        })
    }
}

/// MySQL backend for [`crate::store::AttendanceStore`].
pub struct MySqlPersistence {
    pool: MySqlPool,
}

impl MySqlPersistence {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Persistence for MySqlPersistence {
    async fn load(&self) -> anyhow::Result<Snapshot> {
        let (employees, rows, next_attendance_id) = futures::try_join!(
            sqlx::query_as::<_, Employee>(
                "SELECT employee_id, full_name, email, department, created_at FROM employees",
            )
            .fetch_all(&self.pool),
            sqlx::query_as::<_, AttendanceRow>(
                "SELECT id, employee_id, date, status, created_at FROM attendance",
            )
            .fetch_all(&self.pool),
            sqlx::query_scalar::<_, u64>("SELECT next_id FROM id_sequence WHERE name = ?")
                .bind(ATTENDANCE_SEQUENCE)
                .fetch_optional(&self.pool),
        )
        .context("Failed to load snapshot")?;

        let attendance = rows
            .into_iter()
            .map(AttendanceRecord::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Snapshot {
            employees,
            attendance,
            next_attendance_id: next_attendance_id.unwrap_or_default(),
        })
    }

    async fn insert_employee(&self, employee: &Employee) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO employees (employee_id, full_name, email, department, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&employee.employee_id)
        .bind(&employee.full_name)
        .bind(&employee.email)
        .bind(&employee.department)
        .bind(employee.created_at)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to insert employee {}", employee.employee_id))?;
        Ok(())
    }

    async fn delete_employee(&self, employee_id: &str) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM attendance WHERE employee_id = ?")
            .bind(employee_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM employees WHERE employee_id = ?")
            .bind(employee_id)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .with_context(|| format!("Failed to delete employee {employee_id}"))?;
        debug!(employee_id, removed_attendance = removed, "Employee rows deleted");
        Ok(())
    }

    async fn save_attendance(&self, record: &AttendanceRecord) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO attendance (id, employee_id, date, status, created_at)
            VALUES (?, ?, ?, ?, ?) AS incoming
            ON DUPLICATE KEY UPDATE status = incoming.status
            "#,
        )
        .bind(record.id)
        .bind(&record.employee_id)
        .bind(record.date)
        .bind(record.status.as_ref())
        .bind(record.created_at)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            r#"
            INSERT INTO id_sequence (name, next_id)
            VALUES (?, ?) AS incoming
            ON DUPLICATE KEY UPDATE next_id = GREATEST(id_sequence.next_id, incoming.next_id)
            "#,
        )
        .bind(ATTENDANCE_SEQUENCE)
        .bind(record.id + 1)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .with_context(|| format!("Failed to save attendance {}", record.id))?;
        Ok(())
    }

    async fn delete_attendance(&self, id: u64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM attendance WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete attendance {id}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::SubsecRound;

    fn row(status: &str) -> AttendanceRow {
        AttendanceRow {
            id: 7,
            employee_id: "EMP-001".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            status: status.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_known_status() {
        let record = AttendanceRecord::try_from(row("Absent")).unwrap();
        assert_eq!(record.status, AttendanceStatus::Absent);
        assert_eq!(record.id, 7);
    }

    #[test]
    fn row_rejects_unknown_status() {
        let err = AttendanceRecord::try_from(row("Late")).unwrap_err();
        assert!(err.to_string().contains("Late"));
    }

    /// Runs against a scratch MySQL database named by `HRMS_TEST_DATABASE_URL`
    /// and is skipped when that is unset. The rows it touches are removed
    /// first.
    #[tokio::test]
    async fn mysql_round_trip() {
        let Ok(url) = std::env::var("HRMS_TEST_DATABASE_URL") else {
            eprintln!("HRMS_TEST_DATABASE_URL not set, skipping");
            return;
        };
        let pool = init_db(&url).await.unwrap();
        ensure_schema(&pool).await.unwrap();
        for id in ["RT-001", "rt-001"] {
            sqlx::query("DELETE FROM employees WHERE employee_id = ?")
                .bind(id)
                .execute(&pool)
                .await
                .unwrap();
        }
        let db = MySqlPersistence::new(pool);

        let created_at = Utc::now().trunc_subsecs(6);
        let employee = |id: &str, email: &str| Employee {
            employee_id: id.to_string(),
            full_name: "Round Trip".to_string(),
            email: email.to_string(),
            department: "QA".to_string(),
            created_at,
        };
        db.insert_employee(&employee("RT-001", "rt-upper@co.com"))
            .await
            .unwrap();
        // Ids differing only in case are distinct rows.
        db.insert_employee(&employee("rt-001", "rt-lower@co.com"))
            .await
            .unwrap();

        let base = db.load().await.unwrap().next_attendance_id.max(1) + 1_000;
        let mut record = AttendanceRecord {
            id: base,
            employee_id: "RT-001".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            status: AttendanceStatus::Present,
            created_at,
        };
        db.save_attendance(&record).await.unwrap();
        record.status = AttendanceStatus::Absent;
        db.save_attendance(&record).await.unwrap();
        db.save_attendance(&AttendanceRecord {
            id: base + 1,
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            ..record.clone()
        })
        .await
        .unwrap();

        let snapshot = db.load().await.unwrap();
        let ours: Vec<&AttendanceRecord> = snapshot
            .attendance
            .iter()
            .filter(|r| r.employee_id == "RT-001")
            .collect();
        assert_eq!(ours.len(), 2);
        assert!(ours.contains(&&record));
        assert_eq!(snapshot.next_attendance_id, base + 2);

        // Deleting the newest record does not lower the high-water mark.
        db.delete_attendance(base + 1).await.unwrap();
        assert_eq!(db.load().await.unwrap().next_attendance_id, base + 2);

        db.delete_employee("RT-001").await.unwrap();
        let snapshot = db.load().await.unwrap();
        assert!(snapshot.attendance.iter().all(|r| r.employee_id != "RT-001"));
        assert!(snapshot.employees.iter().any(|e| e.employee_id == "rt-001"));

        db.delete_employee("rt-001").await.unwrap();
    }
}
