use crate::schema::account_sessions;
use chrono::NaiveDateTime;

#[derive(Queryable, Insertable)]
#[diesel(table_name = account_sessions)]
pub struct AccountSession {
    pub token_hash: String,
    pub account_id: String,
    pub issued_at: NaiveDateTime,
}
