use diesel::prelude::*;

use crate::{
    database::assert,
    error::ApiError,
    models::{clinics::Clinic, departments::Department, doctors::Doctor},
};

/// What the assistant may tell a caller about one clinic.
#[derive(Debug, Clone)]
pub struct ClinicDirectory {
    pub clinic: Clinic,
    pub departments: Vec<Department>,
    pub doctors: Vec<Doctor>,
}

impl ClinicDirectory {
    pub fn load(conn: &mut SqliteConnection, clinic_id: &str) -> Result<Self, ApiError> {
        use crate::schema::{departments, doctors};

        let clinic = assert::assert_active_clinic(conn, clinic_id)?;
        let departments = departments::table
            .filter(departments::clinic_id.eq(clinic_id))
            .filter(departments::is_active.eq(true))
            .order(departments::name.asc())
            .load::<Department>(conn)?;
        let doctors = doctors::table
            .filter(doctors::clinic_id.eq(clinic_id))
            .filter(doctors::is_active.eq(true))
            .order(doctors::name.asc())
            .load::<Doctor>(conn)?;

        Ok(Self {
            clinic,
            departments,
            doctors,
        })
    }

    pub fn department_name(&self, department_id: &str) -> Option<&str> {
        self.departments
            .iter()
            .find(|d| d.id == department_id)
            .map(|d| d.name.as_str())
    }

    /// Matches a doctor by id, or by name with or without the "Dr." title.
    pub fn resolve_doctor(&self, value: &str) -> Option<&Doctor> {
        let value = value.trim();
        if let Some(doctor) = self.doctors.iter().find(|d| d.id == value) {
            return Some(doctor);
        }
        let name = strip_title(value);
        self.doctors
            .iter()
            .find(|d| strip_title(&d.name).eq_ignore_ascii_case(name))
    }

    /// Matches a department by id or name.
    pub fn resolve_department(&self, value: &str) -> Option<&Department> {
        let value = value.trim();
        self.departments
            .iter()
            .find(|d| d.id == value || d.name.eq_ignore_ascii_case(value))
    }
}

fn strip_title(name: &str) -> &str {
    let name = name.trim();
    ["Dr. ", "Dr ", "dr. ", "dr "]
        .iter()
        .find_map(|title| name.strip_prefix(title))
        .unwrap_or(name)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn directory() -> ClinicDirectory {
        let at = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        ClinicDirectory {
            clinic: Clinic {
                id: "c1".into(),
                name: "Sunrise Clinic".into(),
                email: None,
                phone: None,
                address: None,
                slug: "sunrise-clinic".into(),
                is_active: true,
                created_at: at,
                updated_at: at,
            },
            departments: vec![Department {
                id: "D0001".into(),
                clinic_id: "c1".into(),
                name: "Cardiology".into(),
                description: None,
                is_active: true,
                created_at: at,
            }],
            doctors: vec![Doctor {
                id: "doc-1".into(),
                clinic_id: "c1".into(),
                department_id: "D0001".into(),
                name: "Dr. Amy Smith".into(),
                specialization: None,
                available_days: "[]".into(),
                available_times: "[]".into(),
                is_active: true,
                created_at: at,
            }],
        }
    }

    #[test]
    fn doctors_resolve_by_id_or_name() {
        let directory = directory();
        assert_eq!(directory.resolve_doctor("doc-1").unwrap().id, "doc-1");
        assert_eq!(directory.resolve_doctor("amy smith").unwrap().id, "doc-1");
        assert_eq!(directory.resolve_doctor("Dr. Amy Smith").unwrap().id, "doc-1");
        assert!(directory.resolve_doctor("Dr. Who").is_none());
    }

    #[test]
    fn departments_resolve_by_id_or_name() {
        let directory = directory();
        assert_eq!(directory.resolve_department("cardiology").unwrap().id, "D0001");
        assert_eq!(directory.department_name("D0001"), Some("Cardiology"));
    }
}
