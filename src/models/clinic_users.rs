use crate::schema::clinic_users;
use chrono::NaiveDateTime;

#[derive(Queryable, Clone, Debug)]
pub struct ClinicUser {
    pub id: i32,
    pub account_id: String,
    pub clinic_id: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = clinic_users)]
pub struct NewClinicUser {
    pub account_id: String,
    pub clinic_id: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}
