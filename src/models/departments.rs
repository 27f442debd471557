use crate::schema::departments;
use chrono::NaiveDateTime;

#[derive(Queryable, Clone, Debug)]
pub struct Department {
    pub id: String,
    pub clinic_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = departments)]
pub struct NewDepartment {
    pub id: String,
    pub clinic_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = departments)]
pub struct UpdateDepartment {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}
