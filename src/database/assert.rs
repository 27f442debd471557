use diesel::prelude::*;

use crate::{
    error::ApiError,
    models::{clinics::Clinic, departments::Department, doctors::Doctor},
};

pub fn assert_clinic(conn: &mut SqliteConnection, clinic_id: &str) -> Result<Clinic, ApiError> {
    use crate::schema::clinics;

    clinics::table
        .filter(clinics::id.eq(clinic_id))
        .get_result::<Clinic>(conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("No such clinic"))
}

/// Patient-facing writes only go to active clinics.
pub fn assert_active_clinic(
    conn: &mut SqliteConnection,
    clinic_id: &str,
) -> Result<Clinic, ApiError> {
    let clinic = assert_clinic(conn, clinic_id)?;
    if !clinic.is_active {
        return Err(ApiError::validation("Clinic is not active"));
    }
    Ok(clinic)
}

pub fn assert_clinic_slug(conn: &mut SqliteConnection, slug: &str) -> Result<Clinic, ApiError> {
    use crate::schema::clinics;

    clinics::table
        .filter(clinics::slug.eq(slug))
        .filter(clinics::is_active.eq(true))
        .get_result::<Clinic>(conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("No such clinic"))
}

pub fn assert_department(
    conn: &mut SqliteConnection,
    department_id: &str,
) -> Result<Department, ApiError> {
    use crate::schema::departments;

    departments::table
        .filter(departments::id.eq(department_id))
        .get_result::<Department>(conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("No such department"))
}

pub fn assert_department_in_clinic(
    conn: &mut SqliteConnection,
    department_id: &str,
    clinic_id: &str,
) -> Result<Department, ApiError> {
    use crate::schema::departments;

    let department = departments::table
        .filter(departments::id.eq(department_id))
        .filter(departments::clinic_id.eq(clinic_id))
        .filter(departments::is_active.eq(true))
        .get_result::<Department>(conn)
        .optional()?;
    department.ok_or_else(|| ApiError::validation("No such department in this clinic"))
}

pub fn assert_doctor(conn: &mut SqliteConnection, doctor_id: &str) -> Result<Doctor, ApiError> {
    use crate::schema::doctors;

    doctors::table
        .filter(doctors::id.eq(doctor_id))
        .get_result::<Doctor>(conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("No such doctor"))
}

pub fn assert_doctor_in_clinic(
    conn: &mut SqliteConnection,
    doctor_id: &str,
    clinic_id: &str,
) -> Result<Doctor, ApiError> {
    use crate::schema::doctors;

    let doctor = doctors::table
        .filter(doctors::id.eq(doctor_id))
        .filter(doctors::clinic_id.eq(clinic_id))
        .filter(doctors::is_active.eq(true))
        .get_result::<Doctor>(conn)
        .optional()?;
    doctor.ok_or_else(|| ApiError::validation("No such doctor in this clinic"))
}
