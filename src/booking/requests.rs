use chrono::NaiveDate;
use serde::Deserialize;

use crate::{error::ApiError, utils};

/// Required fields are optional here so a missing one is reported as a
/// validation error naming it, not as a JSON decoding failure.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub clinic_id: Option<String>,
    pub patient_name: Option<String>,
    pub patient_phone: Option<String>,
    pub patient_email: Option<String>,
    pub doctor_id: Option<String>,
    pub department_id: Option<String>,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub notes: Option<String>,
}

/// A booking that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidBooking {
    pub clinic_id: String,
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: Option<String>,
    pub doctor_id: String,
    pub department_id: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub notes: Option<String>,
}

impl BookingRequest {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let fields = [
            ("clinicId", &self.clinic_id),
            ("patientName", &self.patient_name),
            ("patientPhone", &self.patient_phone),
            ("doctorId", &self.doctor_id),
            ("departmentId", &self.department_id),
            ("appointmentDate", &self.appointment_date),
            ("appointmentTime", &self.appointment_time),
        ];
        fields
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
            .map(|(name, _)| *name)
            .collect()
    }

    pub fn validate(self) -> Result<ValidBooking, ApiError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(ApiError::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let required = |v: Option<String>| v.map(|v| v.trim().to_string()).unwrap_or_default();
        let patient_phone = required(self.patient_phone);
        if !utils::is_valid_phone(&patient_phone) {
            return Err(ApiError::validation("Wrong format on 'patientPhone'"));
        }
        let patient_email = utils::non_blank(self.patient_email);
        if let Some(email) = &patient_email {
            if !utils::is_valid_email(email) {
                return Err(ApiError::validation("Wrong format on 'patientEmail'"));
            }
        }
        let appointment_date =
            utils::parse_date("appointmentDate", &required(self.appointment_date))?;
        let appointment_time = required(self.appointment_time);
        if !utils::is_valid_time(&appointment_time) {
            return Err(ApiError::validation(
                "Wrong format on 'appointmentTime', expected HH:MM",
            ));
        }

        Ok(ValidBooking {
            clinic_id: required(self.clinic_id),
            patient_name: required(self.patient_name),
            patient_phone,
            patient_email,
            doctor_id: required(self.doctor_id),
            department_id: required(self.department_id),
            appointment_date,
            appointment_time,
            notes: utils::non_blank(self.notes),
        })
    }
}
