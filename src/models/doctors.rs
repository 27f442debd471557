use crate::schema::doctors;
use chrono::NaiveDateTime;

/// Availability lists are stored as JSON arrays of strings.
#[derive(Queryable, Clone, Debug)]
pub struct Doctor {
    pub id: String,
    pub clinic_id: String,
    pub department_id: String,
    pub name: String,
    pub specialization: Option<String>,
    pub available_days: String,
    pub available_times: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl Doctor {
    pub fn days(&self) -> Vec<String> {
        serde_json::from_str(&self.available_days).unwrap_or_default()
    }

    pub fn times(&self) -> Vec<String> {
        serde_json::from_str(&self.available_times).unwrap_or_default()
    }
}

#[derive(Insertable)]
#[diesel(table_name = doctors)]
pub struct NewDoctor {
    pub id: String,
    pub clinic_id: String,
    pub department_id: String,
    pub name: String,
    pub specialization: Option<String>,
    pub available_days: String,
    pub available_times: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = doctors)]
pub struct UpdateDoctor {
    pub department_id: Option<String>,
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub available_days: Option<String>,
    pub available_times: Option<String>,
    pub is_active: Option<bool>,
}

pub const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];
