use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::error::{ErrorBody, StoreError};
use crate::model::attendance::{AttendanceFilter, AttendanceRecord};
use crate::store::AttendanceStore;
use crate::utils::validation::{optional, parse_date, parse_optional_date, parse_status};

/// Body of `POST /attendance`. Date and status arrive as strings so that a
/// bad value is reported against its field.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct MarkAttendance {
    #[schema(example = "EMP-001")]
    pub employee_id: String,
    #[schema(example = "2024-01-01", format = "date", value_type = String)]
    pub date: String,
    #[schema(example = "Present")]
    pub status: String,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AttendanceQuery {
    /// Only records of this employee
    #[schema(example = "EMP-001")]
    pub employee_id: Option<String>,
    /// Inclusive lower bound (YYYY-MM-DD)
    #[schema(example = "2024-01-01")]
    pub date_from: Option<String>,
    /// Inclusive upper bound (YYYY-MM-DD)
    #[schema(example = "2024-01-31")]
    pub date_to: Option<String>,
}

impl AttendanceQuery {
    fn into_filter(self) -> Result<AttendanceFilter, StoreError> {
        Ok(AttendanceFilter {
            employee_id: optional(self.employee_id.as_deref()),
            date_from: parse_optional_date("date_from", self.date_from.as_deref())?,
            date_to: parse_optional_date("date_to", self.date_to.as_deref())?,
        })
    }
}

/// List attendance records
#[utoipa::path(
    get,
    path = "/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Matching records, newest date first", body = [AttendanceRecord]),
        (status = 400, description = "Malformed date filter", body = ErrorBody, example = json!({
            "message": "date_from must be a valid calendar date (YYYY-MM-DD)",
            "field": "date_from"
        }))
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    store: web::Data<AttendanceStore>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, StoreError> {
    let filter = query.into_inner().into_filter()?;
    let records = store.query_attendance(&filter).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Mark attendance (insert or overwrite the day's status)
#[utoipa::path(
    post,
    path = "/attendance",
    request_body = MarkAttendance,
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceRecord),
        (status = 200, description = "Existing record for that day updated", body = AttendanceRecord),
        (status = 400, description = "Invalid date or status", body = ErrorBody, example = json!({
            "message": "status must be 'Present' or 'Absent'",
            "field": "status"
        })),
        (status = 404, description = "Employee not found", body = ErrorBody, example = json!({
            "message": "Employee 'EMP-404' not found"
        })),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Attendance"
)]
#[instrument(
    name = "mark_attendance",
    skip(store, payload),
    fields(employee_id = %payload.employee_id, date = %payload.date)
)]
pub async fn mark_attendance(
    store: web::Data<AttendanceStore>,
    payload: web::Json<MarkAttendance>,
) -> Result<HttpResponse, StoreError> {
    let MarkAttendance {
        employee_id,
        date,
        status,
    } = payload.into_inner();
    let date = parse_date("date", &date)?;
    let status = parse_status(&status)?;

    let outcome = store.mark_attendance(&employee_id, date, status).await?;
    info!(
        id = outcome.record().id,
        %status,
        created = outcome.is_created(),
        "Attendance marked"
    );

    let mut response = if outcome.is_created() {
        HttpResponse::Created()
    } else {
        HttpResponse::Ok()
    };
    Ok(response.json(outcome.into_record()))
}

/// Delete an attendance record
#[utoipa::path(
    delete,
    path = "/attendance/{id}",
    params(
        ("id", Path, description = "Attendance record ID")
    ),
    responses(
        (status = 204, description = "Successfully deleted"),
        (status = 404, description = "Attendance record not found", body = ErrorBody, example = json!({
            "message": "Attendance record not found"
        })),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Attendance"
)]
#[instrument(name = "delete_attendance", skip(store, path), fields(id = *path))]
pub async fn delete_attendance(
    store: web::Data<AttendanceStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, StoreError> {
    store.delete_attendance(path.into_inner()).await?;
    info!("Attendance deleted");
    Ok(HttpResponse::NoContent().finish())
}
