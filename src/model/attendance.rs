use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    ToSchema,
)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": "EMP-001",
        "date": "2024-01-01",
        "status": "Present",
        "created_at": "2024-01-01T09:00:00Z"
    })
)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "EMP-001")]
    pub employee_id: String,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub date: NaiveDate,

    pub status: AttendanceStatus,

    #[schema(
        example = "2024-01-01T09:00:00Z",
        value_type = String,
        format = "date-time"
    )]
    pub created_at: DateTime<Utc>,
}

/// Optional AND-combined constraints for listing attendance.
/// Both date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceFilter {
    pub employee_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl AttendanceFilter {
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        if let Some(employee_id) = &self.employee_id {
            if record.employee_id != *employee_id {
                return false;
            }
        }
        if let Some(from) = self.date_from {
            if record.date < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if record.date > to {
                return false;
            }
        }
        true
    }
}

/// Result of an attendance upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkOutcome {
    Created(AttendanceRecord),
    Updated(AttendanceRecord),
}

impl MarkOutcome {
    pub fn record(&self) -> &AttendanceRecord {
        match self {
            MarkOutcome::Created(r) | MarkOutcome::Updated(r) => r,
        }
    }

    pub fn into_record(self) -> AttendanceRecord {
        match self {
            MarkOutcome::Created(r) | MarkOutcome::Updated(r) => r,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, MarkOutcome::Created(_))
    }
}
