use actix_web::{HttpResponse, web};
use chrono::Local;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::error::{ErrorBody, StoreError};
use crate::model::dashboard::DashboardSummary;
use crate::store::AttendanceStore;
use crate::utils::validation::parse_optional_date;

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// Day to count attendance for; defaults to the server's local date
    #[schema(example = "2024-01-01")]
    pub today: Option<String>,
}

/// Dashboard statistics
#[utoipa::path(
    get,
    path = "/dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Aggregated counts", body = DashboardSummary),
        (status = 400, description = "Malformed date", body = ErrorBody)
    ),
    tag = "Dashboard"
)]
pub async fn dashboard(
    store: web::Data<AttendanceStore>,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse, StoreError> {
    let today = parse_optional_date("today", query.today.as_deref())?
        .unwrap_or_else(|| Local::now().date_naive());

    let mut summary = store.dashboard(today).await;
    summary
        .departments
        .sort_by(|a, b| a.department.cmp(&b.department));
    summary.present_days_per_employee.sort_by(|a, b| {
        b.present_days
            .cmp(&a.present_days)
            .then_with(|| a.employee_id.cmp(&b.employee_id))
    });

    Ok(HttpResponse::Ok().json(summary))
}
