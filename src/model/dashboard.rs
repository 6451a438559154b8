use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DepartmentCount {
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = 2)]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EmployeePresence {
    #[schema(example = "EMP-001")]
    pub employee_id: String,
    #[schema(example = 12)]
    pub present_days: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "total_employees": 2,
    "present_today": 1,
    "absent_today": 1,
    "departments": [{"department": "Engineering", "count": 2}],
    "present_days_per_employee": [{"employee_id": "EMP-001", "present_days": 12}]
}))]
pub struct DashboardSummary {
    pub total_employees: usize,
    pub present_today: usize,
    pub absent_today: usize,
    pub departments: Vec<DepartmentCount>,
    pub present_days_per_employee: Vec<EmployeePresence>,
}
