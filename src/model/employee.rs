use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::StoreError;
use crate::utils::validation::{is_valid_email, required, within};

/// Column widths of the `employees` table.
pub const MAX_EMPLOYEE_ID_LEN: usize = 64;
pub const MAX_FULL_NAME_LEN: usize = 255;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_DEPARTMENT_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "employee_id": "EMP-001",
        "full_name": "Ada Lovelace",
        "email": "ada@co.com",
        "department": "Engineering",
        "created_at": "2024-01-01T09:00:00Z"
    })
)]
pub struct Employee {
    #[schema(example = "EMP-001")]
    pub employee_id: String,

    #[schema(example = "Ada Lovelace")]
    pub full_name: String,

    #[schema(example = "ada@co.com", format = "email")]
    pub email: String,

    #[schema(example = "Engineering")]
    pub department: String,

    #[schema(
        example = "2024-01-01T09:00:00Z",
        value_type = String,
        format = "date-time"
    )]
    pub created_at: DateTime<Utc>,
}

/// Candidate submitted to `POST /employees`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct NewEmployee {
    #[schema(example = "EMP-001", value_type = String)]
    pub employee_id: String,
    #[schema(example = "Ada Lovelace", value_type = String)]
    pub full_name: String,
    #[schema(example = "ada@co.com", format = "email", value_type = String)]
    pub email: String,
    #[schema(example = "Engineering", value_type = String)]
    pub department: String,
}

impl NewEmployee {
    /// Trims every field and checks it, reporting the first offending field.
    pub fn validate(self) -> Result<Self, StoreError> {
        let employee_id = required("employee_id", &self.employee_id)
            .and_then(|v| within("employee_id", v, MAX_EMPLOYEE_ID_LEN))?;
        let full_name = required("full_name", &self.full_name)
            .and_then(|v| within("full_name", v, MAX_FULL_NAME_LEN))?;
        let email = required("email", &self.email)
            .and_then(|v| within("email", v, MAX_EMAIL_LEN))?;
        if !is_valid_email(&email) {
            return Err(StoreError::validation("email", "Invalid email format"));
        }
        let department = required("department", &self.department)
            .and_then(|v| within("department", v, MAX_DEPARTMENT_LEN))?;

        Ok(Self {
            employee_id,
            full_name,
            email,
            department,
        })
    }

    pub(crate) fn into_employee(self, created_at: DateTime<Utc>) -> Employee {
        Employee {
            employee_id: self.employee_id,
            full_name: self.full_name,
            email: self.email,
            department: self.department,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(email: &str) -> NewEmployee {
        NewEmployee {
            employee_id: "  EMP-001 ".to_string(),
            full_name: "Ada Lovelace".to_string(),
            email: email.to_string(),
            department: " Engineering".to_string(),
        }
    }

    #[test]
    fn validate_trims_fields() {
        let valid = candidate("ada@co.com").validate().unwrap();
        assert_eq!(valid.employee_id, "EMP-001");
        assert_eq!(valid.department, "Engineering");
    }

    #[test]
    fn validate_rejects_bad_email() {
        let err = candidate("ada.co.com").validate().unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "email", .. }));
    }

    #[test]
    fn validate_enforces_column_widths() {
        let mut c = candidate("ada@co.com");
        c.employee_id = "E".repeat(MAX_EMPLOYEE_ID_LEN + 1);
        let err = c.validate().unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "employee_id", .. }));

        let mut c = candidate("ada@co.com");
        c.full_name = "n".repeat(MAX_FULL_NAME_LEN + 1);
        let err = c.validate().unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "full_name", .. }));

        let mut c = candidate("ada@co.com");
        c.department = "d".repeat(MAX_DEPARTMENT_LEN + 1);
        let err = c.validate().unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "department", .. }));

        // Surrounding whitespace does not count towards the limit.
        let mut c = candidate("ada@co.com");
        c.employee_id = format!("  {}  ", "E".repeat(MAX_EMPLOYEE_ID_LEN));
        assert_eq!(c.validate().unwrap().employee_id.len(), MAX_EMPLOYEE_ID_LEN);
    }

    #[test]
    fn validate_reports_first_blank_field() {
        let mut c = candidate("ada@co.com");
        c.full_name = "   ".to_string();
        let err = c.validate().unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "full_name", .. }));
    }
}
