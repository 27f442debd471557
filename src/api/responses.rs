use serde::Serialize;

use crate::models::{departments::Department, doctors::Doctor};

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DoctorItem {
    pub id: String,
    pub clinic_id: String,
    pub department_id: String,
    pub department_name: Option<String>,
    pub name: String,
    pub specialization: Option<String>,
    pub available_days: Vec<String>,
    pub available_times: Vec<String>,
    pub is_active: bool,
}

impl DoctorItem {
    pub fn new(data: Doctor, department_name: Option<String>) -> Self {
        Self {
            available_days: data.days(),
            available_times: data.times(),
            id: data.id,
            clinic_id: data.clinic_id,
            department_id: data.department_id,
            department_name,
            name: data.name,
            specialization: data.specialization,
            is_active: data.is_active,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentItem {
    pub id: String,
    pub clinic_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

impl From<Department> for DepartmentItem {
    fn from(data: Department) -> Self {
        Self {
            id: data.id,
            clinic_id: data.clinic_id,
            name: data.name,
            description: data.description,
            is_active: data.is_active,
        }
    }
}

#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DoctorFilters {
    pub clinic_id: Option<String>,
    pub department_id: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentFilters {
    pub clinic_id: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Serialize)]
pub struct TranscriptionResponse {
    pub success: bool,
    pub text: String,
}
