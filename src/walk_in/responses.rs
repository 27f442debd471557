use serde::Serialize;

use crate::models::walk_ins::WalkIn;

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WalkInItem {
    pub walk_in_id: String,
    pub clinic_id: Option<String>,
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub reason: String,
    pub status: String,
    pub created_at: String,
}

impl From<WalkIn> for WalkInItem {
    fn from(data: WalkIn) -> Self {
        Self {
            walk_in_id: data.id,
            clinic_id: data.clinic_id,
            patient_name: data.patient_name,
            patient_phone: data.patient_phone,
            patient_email: data.patient_email,
            age: data.age,
            gender: data.gender,
            reason: data.reason,
            status: data.status,
            created_at: crate::utils::format_time_str(&data.created_at),
        }
    }
}
