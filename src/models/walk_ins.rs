use crate::schema::walk_ins;
use chrono::NaiveDateTime;

#[derive(Queryable, Clone, Debug)]
pub struct WalkIn {
    pub id: String,
    pub clinic_id: Option<String>,
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub reason: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = walk_ins)]
pub struct NewWalkIn {
    pub id: String,
    pub clinic_id: Option<String>,
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub reason: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

pub const WALK_IN_STATUS_WAITING: &str = "waiting";

pub const WALK_IN_STATUSES: [&str; 4] = [
    WALK_IN_STATUS_WAITING,
    "in_progress",
    "completed",
    "cancelled",
];

pub const GENDERS: [&str; 3] = ["male", "female", "other"];
