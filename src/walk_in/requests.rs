use serde::Deserialize;

use crate::{error::ApiError, models::walk_ins::GENDERS, utils};

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct WalkInRequest {
    pub clinic_id: Option<String>,
    pub patient_name: Option<String>,
    pub patient_phone: Option<String>,
    pub patient_email: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidWalkIn {
    pub clinic_id: Option<String>,
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub reason: String,
}

impl WalkInRequest {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let fields = [
            ("patientName", &self.patient_name),
            ("patientPhone", &self.patient_phone),
            ("reason", &self.reason),
        ];
        fields
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
            .map(|(name, _)| *name)
            .collect()
    }

    pub fn validate(self) -> Result<ValidWalkIn, ApiError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(ApiError::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let patient_phone = utils::non_blank(self.patient_phone).unwrap_or_default();
        if !utils::is_valid_phone(&patient_phone) {
            return Err(ApiError::validation("Wrong format on 'patientPhone'"));
        }
        let patient_email = utils::non_blank(self.patient_email);
        if let Some(email) = &patient_email {
            if !utils::is_valid_email(email) {
                return Err(ApiError::validation("Wrong format on 'patientEmail'"));
            }
        }
        if let Some(age) = self.age {
            if !(0..=150).contains(&age) {
                return Err(ApiError::validation("Wrong value on 'age'"));
            }
        }
        let gender = utils::non_blank(self.gender).map(|g| g.to_lowercase());
        if let Some(gender) = &gender {
            if !GENDERS.contains(&gender.as_str()) {
                return Err(ApiError::validation("Wrong value on 'gender'"));
            }
        }

        Ok(ValidWalkIn {
            clinic_id: utils::non_blank(self.clinic_id),
            patient_name: utils::non_blank(self.patient_name).unwrap_or_default(),
            patient_phone,
            patient_email,
            age: self.age,
            gender,
            reason: utils::non_blank(self.reason).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> WalkInRequest {
        WalkInRequest {
            clinic_id: None,
            patient_name: Some("Sam Lee".into()),
            patient_phone: Some("5551234567".into()),
            patient_email: None,
            age: Some(34),
            gender: Some("Female".into()),
            reason: Some("Sprained ankle".into()),
        }
    }

    #[test]
    fn gender_is_normalised() {
        let walk_in = request().validate().unwrap();
        assert_eq!(walk_in.gender.as_deref(), Some("female"));
        assert_eq!(walk_in.clinic_id, None);
    }

    #[test]
    fn reason_is_required() {
        let mut req = request();
        req.reason = Some(" ".into());
        assert_eq!(req.missing_fields(), vec!["reason"]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn unknown_gender_is_rejected() {
        let mut req = request();
        req.gender = Some("robot".into());
        assert!(matches!(req.validate(), Err(ApiError::Validation(_))));
    }
}
