use crate::schema::appointments;
use chrono::NaiveDateTime;

#[derive(Queryable, Clone, Debug)]
pub struct Appointment {
    pub id: String,
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
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = appointments)]
pub struct NewAppointment {
    pub id: String,
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
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

pub const APPOINT_STATUS_PENDING: &str = "pending";
pub const APPOINT_STATUS_CONFIRMED: &str = "confirmed";
pub const APPOINT_STATUS_CANCELLED: &str = "cancelled";
pub const APPOINT_STATUS_COMPLETED: &str = "completed";

/// Statuses that occupy a slot.
pub const LIVE_STATUSES: [&str; 2] = [APPOINT_STATUS_PENDING, APPOINT_STATUS_CONFIRMED];

pub const ALL_STATUSES: [&str; 4] = [
    APPOINT_STATUS_PENDING,
    APPOINT_STATUS_CONFIRMED,
    APPOINT_STATUS_CANCELLED,
    APPOINT_STATUS_COMPLETED,
];

/// Whether an appointment may move from `from` to `to`.
pub fn status_transition_allowed(from: &str, to: &str) -> bool {
    matches!(
        (from, to),
        (APPOINT_STATUS_PENDING, APPOINT_STATUS_CONFIRMED)
            | (APPOINT_STATUS_PENDING, APPOINT_STATUS_CANCELLED)
            | (APPOINT_STATUS_PENDING, APPOINT_STATUS_COMPLETED)
            | (APPOINT_STATUS_CONFIRMED, APPOINT_STATUS_CANCELLED)
            | (APPOINT_STATUS_CONFIRMED, APPOINT_STATUS_COMPLETED)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses_do_not_move() {
        for to in ALL_STATUSES {
            assert!(!status_transition_allowed(APPOINT_STATUS_CANCELLED, to));
            assert!(!status_transition_allowed(APPOINT_STATUS_COMPLETED, to));
        }
    }

    #[test]
    fn live_statuses_move_forward_only() {
        assert!(status_transition_allowed("pending", "confirmed"));
        assert!(status_transition_allowed("confirmed", "completed"));
        assert!(!status_transition_allowed("confirmed", "pending"));
        assert!(!status_transition_allowed("pending", "pending"));
    }
}
