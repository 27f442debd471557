use serde::Serialize;

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookedAppointment {
    pub appointment_id: String,
    pub patient_name: String,
    pub doctor_name: String,
    pub department_name: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub status: String,
    pub notes: Option<String>,
}
