use serde::Serialize;

use crate::{api::responses::DepartmentItem, models::clinics::Clinic};

/// What a patient sees on a clinic's landing page.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ClinicPage {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub departments: Vec<DepartmentItem>,
}

impl ClinicPage {
    pub fn new(clinic: Clinic, departments: Vec<DepartmentItem>) -> Self {
        Self {
            id: clinic.id,
            name: clinic.name,
            slug: clinic.slug,
            email: clinic.email,
            phone: clinic.phone,
            address: clinic.address,
            departments,
        }
    }
}
