use actix_web::{HttpResponse, Responder, web};
use tracing::{info, instrument};

use crate::error::{ErrorBody, StoreError};
use crate::model::employee::{Employee, NewEmployee};
use crate::store::AttendanceStore;

/// List Employees
#[utoipa::path(
    get,
    path = "/employees",
    responses(
        (status = 200, description = "All employees, newest first", body = [Employee])
    ),
    tag = "Employee"
)]
pub async fn list_employees(store: web::Data<AttendanceStore>) -> impl Responder {
    HttpResponse::Ok().json(store.list_employees().await)
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/employees",
    request_body = NewEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Missing or malformed field", body = ErrorBody, example = json!({
            "message": "Invalid email format",
            "field": "email"
        })),
        (status = 409, description = "Employee ID or email already exists", body = ErrorBody, example = json!({
            "message": "Employee ID 'EMP-001' already exists"
        })),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Employee"
)]
#[instrument(
    name = "create_employee",
    skip(store, payload),
    fields(employee_id = %payload.employee_id)
)]
pub async fn create_employee(
    store: web::Data<AttendanceStore>,
    payload: web::Json<NewEmployee>,
) -> Result<HttpResponse, StoreError> {
    let employee = store.add_employee(payload.into_inner()).await?;
    info!(department = %employee.department, "Employee created");
    Ok(HttpResponse::Created().json(employee))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found", body = ErrorBody, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    store: web::Data<AttendanceStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, StoreError> {
    let employee = store.get_employee(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(employee))
}

/// Delete Employee and all of their attendance
#[utoipa::path(
    delete,
    path = "/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 204, description = "Successfully deleted"),
        (status = 404, description = "Employee not found", body = ErrorBody, example = json!({
            "message": "Employee not found"
        })),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Employee"
)]
#[instrument(name = "delete_employee", skip(store, path), fields(employee_id = %path.as_str()))]
pub async fn delete_employee(
    store: web::Data<AttendanceStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, StoreError> {
    store.delete_employee(&path.into_inner()).await?;
    info!("Employee deleted");
    Ok(HttpResponse::NoContent().finish())
}
