use serde::Deserialize;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegisterClinicRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClinicRequest {
    pub clinic_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeactivateClinicRequest {
    pub clinic_id: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AddDepartRequest {
    pub clinic_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModifyDepartRequest {
    pub department_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AddDoctorRequest {
    pub clinic_id: Option<String>,
    pub department_id: Option<String>,
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub available_days: Option<Vec<String>>,
    pub available_times: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModifyDoctorRequest {
    pub doctor_id: Option<String>,
    pub department_id: Option<String>,
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub available_days: Option<Vec<String>>,
    pub available_times: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchAppointRequest {
    pub clinic_id: Option<String>,
    pub doctor_id: Option<String>,
    pub status: Option<String>,
    pub patient_name: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointStatusRequest {
    pub appointment_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchWalkInRequest {
    pub clinic_id: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWalkInStatusRequest {
    pub walk_in_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub clinic_id: Option<String>,
    pub account_id: Option<String>,
    pub role: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RemoveMemberRequest {
    pub clinic_id: Option<String>,
    pub account_id: Option<String>,
}
