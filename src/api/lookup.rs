use std::collections::HashMap;

use diesel::{prelude::*, sqlite::Sqlite};

use crate::{
    error::ApiError,
    models::{departments::Department, doctors::Doctor},
};

use super::responses::{DepartmentFilters, DepartmentItem, DoctorFilters, DoctorItem};

/// `None` means every clinic; `Some` restricts rows to the listed clinics.
pub type ClinicScope = Option<Vec<String>>;

fn filtered_doctors<'a>(
    filters: &'a DoctorFilters,
    scope: &'a ClinicScope,
) -> crate::schema::doctors::BoxedQuery<'a, Sqlite> {
    use crate::schema::doctors;

    let mut query = doctors::table.into_boxed();
    if let Some(clinic_id) = &filters.clinic_id {
        query = query.filter(doctors::clinic_id.eq(clinic_id));
    }
    if let Some(department_id) = &filters.department_id {
        query = query.filter(doctors::department_id.eq(department_id));
    }
    if let Some(is_active) = filters.is_active {
        query = query.filter(doctors::is_active.eq(is_active));
    }
    if let Some(clinic_ids) = scope {
        query = query.filter(doctors::clinic_id.eq_any(clinic_ids));
    }
    query
}

fn department_names(
    conn: &mut SqliteConnection,
    ids: Vec<String>,
) -> Result<HashMap<String, String>, ApiError> {
    use crate::schema::departments;

    let rows = departments::table
        .filter(departments::id.eq_any(ids))
        .select((departments::id, departments::name))
        .load::<(String, String)>(conn)?;
    Ok(rows.into_iter().collect())
}

/// One page of doctors plus the total matching count.
pub fn search_doctors(
    conn: &mut SqliteConnection,
    filters: &DoctorFilters,
    scope: &ClinicScope,
    limit: i64,
    offset: i64,
) -> Result<(Vec<DoctorItem>, i64), ApiError> {
    use crate::schema::doctors;

    let total = filtered_doctors(filters, scope)
        .count()
        .get_result::<i64>(conn)?;
    let docs = filtered_doctors(filters, scope)
        .order((doctors::name.asc(), doctors::id.asc()))
        .offset(offset)
        .limit(limit)
        .load::<Doctor>(conn)?;

    let names = department_names(conn, docs.iter().map(|d| d.department_id.clone()).collect())?;
    let docs = docs
        .into_iter()
        .map(|data| {
            let department_name = names.get(&data.department_id).cloned();
            DoctorItem::new(data, department_name)
        })
        .collect();
    Ok((docs, total))
}

fn filtered_departments<'a>(
    filters: &'a DepartmentFilters,
    scope: &'a ClinicScope,
) -> crate::schema::departments::BoxedQuery<'a, Sqlite> {
    use crate::schema::departments;

    let mut query = departments::table.into_boxed();
    if let Some(clinic_id) = &filters.clinic_id {
        query = query.filter(departments::clinic_id.eq(clinic_id));
    }
    if let Some(is_active) = filters.is_active {
        query = query.filter(departments::is_active.eq(is_active));
    }
    if let Some(clinic_ids) = scope {
        query = query.filter(departments::clinic_id.eq_any(clinic_ids));
    }
    query
}

pub fn search_departments(
    conn: &mut SqliteConnection,
    filters: &DepartmentFilters,
    scope: &ClinicScope,
    limit: i64,
    offset: i64,
) -> Result<(Vec<DepartmentItem>, i64), ApiError> {
    use crate::schema::departments;

    let total = filtered_departments(filters, scope)
        .count()
        .get_result::<i64>(conn)?;
    let departs = filtered_departments(filters, scope)
        .order((departments::name.asc(), departments::id.asc()))
        .offset(offset)
        .limit(limit)
        .load::<Department>(conn)?;
    Ok((departs.into_iter().map(DepartmentItem::from).collect(), total))
}
