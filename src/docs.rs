use crate::api::attendance::{AttendanceQuery, MarkAttendance};
use crate::api::dashboard::DashboardQuery;
use crate::error::ErrorBody;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::dashboard::{DashboardSummary, DepartmentCount, EmployeePresence};
use crate::model::employee::{Employee, NewEmployee};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRMS Lite API",
        version = "1.0.0",
        description = r#"
## HRMS Lite

A single-admin HR backend for a small team.

### Features
- **Employees**: add, list, view and delete (deleting an employee removes their attendance)
- **Attendance**: mark a day as Present or Absent; marking the same day again overwrites the status
- **Dashboard**: today's present/absent counts, head count per department, present days per employee

### Errors
Every error response carries a `message`; validation errors also name the offending `field`.

| Kind | Status |
|------|--------|
| Validation | 400 |
| Not found | 404 |
| Duplicate employee ID or email | 409 |
"#,
    ),
    paths(
        crate::api::employee::list_employees,
        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::delete_employee,

        crate::api::attendance::list_attendance,
        crate::api::attendance::mark_attendance,
        crate::api::attendance::delete_attendance,

        crate::api::dashboard::dashboard,

        crate::api::health::health
    ),
    components(
        schemas(
            Employee,
            NewEmployee,
            AttendanceRecord,
            AttendanceStatus,
            MarkAttendance,
            AttendanceQuery,
            DashboardQuery,
            DashboardSummary,
            DepartmentCount,
            EmployeePresence,
            ErrorBody
        )
    ),
    tags(
        (name = "Employee", description = "Employee management APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Dashboard", description = "Aggregated statistics"),
        (name = "Health", description = "Service status"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/employees",
            "/employees/{employee_id}",
            "/attendance",
            "/attendance/{id}",
            "/dashboard",
            "/health",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }
}
