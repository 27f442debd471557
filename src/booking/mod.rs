//! Slot conflict checking and appointment creation.
//!
//! The conflict check, id allocation and insert share one immediate
//! transaction, so the database write lock is held from the check to the
//! commit. The partial unique index on live slots backs this up for writers
//! that bypass the service.

pub mod requests;
pub mod responses;

use actix_web::web;
use chrono::{Datelike, NaiveDate, Utc, Weekday};
use diesel::prelude::*;

use crate::{
    database::{
        self, assert,
        sequences::{self, Sequence},
        DbPool,
    },
    error::ApiError,
    models::{
        appointments::{NewAppointment, APPOINT_STATUS_PENDING, LIVE_STATUSES},
        doctors::Doctor,
    },
};

use self::{
    requests::{BookingRequest, ValidBooking},
    responses::BookedAppointment,
};

pub const SLOT_TAKEN: &str = "This appointment slot is no longer available";

/// Whether a pending or confirmed appointment already holds the slot.
pub fn has_conflict(
    conn: &mut SqliteConnection,
    doctor_id: &str,
    date: &str,
    time: &str,
) -> Result<bool, ApiError> {
    use crate::schema::appointments;

    let res = appointments::table
        .filter(appointments::doctor_id.eq(doctor_id))
        .filter(appointments::appointment_date.eq(date))
        .filter(appointments::appointment_time.eq(time))
        .filter(appointments::status.eq_any(LIVE_STATUSES))
        .count()
        .get_result::<i64>(conn)?;
    Ok(res > 0)
}

pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Empty availability lists leave the doctor unrestricted.
fn check_availability(doctor: &Doctor, booking: &ValidBooking) -> Result<(), ApiError> {
    let days = doctor.days();
    let weekday = weekday_name(booking.appointment_date);
    if !days.is_empty() && !days.iter().any(|d| d.eq_ignore_ascii_case(weekday)) {
        return Err(ApiError::validation(format!(
            "Dr. {} does not see patients on {}",
            doctor.name, weekday
        )));
    }

    let times = doctor.times();
    if !times.is_empty() && !times.iter().any(|t| t == &booking.appointment_time) {
        return Err(ApiError::validation(format!(
            "Dr. {} is not available at {}",
            doctor.name, booking.appointment_time
        )));
    }
    Ok(())
}

/// Checks the slot and writes the appointment in one transaction.
pub fn insert_booking(
    conn: &mut SqliteConnection,
    booking: ValidBooking,
    created_by: Option<String>,
) -> Result<BookedAppointment, ApiError> {
    use crate::schema::appointments;

    conn.immediate_transaction(|conn| {
        assert::assert_active_clinic(conn, &booking.clinic_id)?;
        let doctor = assert::assert_doctor_in_clinic(conn, &booking.doctor_id, &booking.clinic_id)?;
        let department =
            assert::assert_department_in_clinic(conn, &booking.department_id, &booking.clinic_id)?;
        if doctor.department_id != department.id {
            return Err(ApiError::validation(
                "Doctor does not belong to this department",
            ));
        }
        check_availability(&doctor, &booking)?;

        let date = booking.appointment_date.format("%Y-%m-%d").to_string();
        if has_conflict(conn, &doctor.id, &date, &booking.appointment_time)? {
            log::info!(
                "slot conflict: doctor {} on {} at {}",
                doctor.id,
                date,
                booking.appointment_time
            );
            return Err(ApiError::Conflict(SLOT_TAKEN.to_string()));
        }

        let id = sequences::next_display_id(conn, Sequence::Appointment)?;
        let now = Utc::now().naive_utc();
        let data = NewAppointment {
            id: id.clone(),
            clinic_id: booking.clinic_id,
            doctor_id: doctor.id.clone(),
            department_id: department.id.clone(),
            patient_name: booking.patient_name.clone(),
            patient_phone: booking.patient_phone,
            patient_email: booking.patient_email,
            appointment_date: date.clone(),
            appointment_time: booking.appointment_time.clone(),
            status: APPOINT_STATUS_PENDING.to_string(),
            notes: booking.notes.clone(),
            created_by,
            created_at: now,
            updated_at: now,
        };
        diesel::insert_into(appointments::table)
            .values(&data)
            .execute(conn)
            .map_err(|err| database::conflict_on_unique(err, SLOT_TAKEN))?;

        log::info!(
            "booked appointment {} with doctor {} on {} at {}",
            id,
            doctor.id,
            date,
            booking.appointment_time
        );

        Ok(BookedAppointment {
            appointment_id: id,
            patient_name: booking.patient_name,
            doctor_name: doctor.name,
            department_name: department.name,
            appointment_date: date,
            appointment_time: booking.appointment_time,
            status: APPOINT_STATUS_PENDING.to_string(),
            notes: booking.notes,
        })
    })
}

/// Validates `request` and books it. `created_by` is `None` for guest and
/// vendor bookings.
pub async fn book(
    pool: &web::Data<DbPool>,
    request: BookingRequest,
    created_by: Option<String>,
) -> Result<BookedAppointment, ApiError> {
    let booking = request.validate()?;
    database::run(pool, move |conn| insert_booking(conn, booking, created_by)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_names_are_lowercase() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(weekday_name(date), "sunday");
        assert!(crate::models::doctors::WEEKDAYS.contains(&weekday_name(date)));
    }
}
