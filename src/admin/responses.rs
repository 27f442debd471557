use serde::Serialize;

use crate::{
    models::{appointments::Appointment, clinic_users::ClinicUser, clinics::Clinic},
    utils::format_time_str,
};

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ClinicItem {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub slug: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Clinic> for ClinicItem {
    fn from(data: Clinic) -> Self {
        Self {
            created_at: format_time_str(&data.created_at),
            updated_at: format_time_str(&data.updated_at),
            id: data.id,
            name: data.name,
            email: data.email,
            phone: data.phone,
            address: data.address,
            slug: data.slug,
            is_active: data.is_active,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentItem {
    pub appointment_id: String,
    pub clinic_id: String,
    pub doctor_id: String,
    pub department_id: String,
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: Option<String>,
    pub appointment_date: String,
    pub appointment_time: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Appointment> for AppointmentItem {
    fn from(data: Appointment) -> Self {
        Self {
            created_at: format_time_str(&data.created_at),
            updated_at: format_time_str(&data.updated_at),
            appointment_id: data.id,
            clinic_id: data.clinic_id,
            doctor_id: data.doctor_id,
            department_id: data.department_id,
            patient_name: data.patient_name,
            patient_phone: data.patient_phone,
            patient_email: data.patient_email,
            appointment_date: data.appointment_date,
            appointment_time: data.appointment_time,
            status: data.status,
            notes: data.notes,
            created_by: data.created_by,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MemberItem {
    pub id: i32,
    pub account_id: String,
    pub clinic_id: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: String,
}

impl From<ClinicUser> for MemberItem {
    fn from(data: ClinicUser) -> Self {
        Self {
            created_at: format_time_str(&data.created_at),
            id: data.id,
            account_id: data.account_id,
            clinic_id: data.clinic_id,
            role: data.role,
            is_active: data.is_active,
        }
    }
}

#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppointFilters {
    pub clinic_id: String,
    pub doctor_id: Option<String>,
    pub status: Option<String>,
    pub patient_name: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct WalkInFilters {
    pub clinic_id: String,
    pub status: Option<String>,
}
