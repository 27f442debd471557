use diesel::{prelude::*, sqlite::Sqlite};

use crate::{
    error::ApiError,
    models::doctors::WEEKDAYS,
    schema::{appointments, walk_ins},
    utils,
};

use super::responses::{AppointFilters, WalkInFilters};

/// Lowercased, de-duplicated weekday names as a JSON array.
pub fn normalize_days(days: Vec<String>) -> Result<String, ApiError> {
    let mut out: Vec<String> = Vec::with_capacity(days.len());
    for day in days {
        let day = day.trim().to_lowercase();
        if !WEEKDAYS.contains(&day.as_str()) {
            return Err(ApiError::validation(format!(
                "Wrong value on 'availableDays': '{}'",
                day
            )));
        }
        if !out.contains(&day) {
            out.push(day);
        }
    }
    Ok(serde_json::to_string(&out).map_err(anyhow::Error::from)?)
}

/// Sorted, de-duplicated `HH:MM` slots as a JSON array.
pub fn normalize_times(times: Vec<String>) -> Result<String, ApiError> {
    let mut out: Vec<String> = Vec::with_capacity(times.len());
    for time in times {
        let time = time.trim().to_string();
        if !utils::is_valid_time(&time) {
            return Err(ApiError::validation(format!(
                "Wrong format on 'availableTimes': '{}', expected HH:MM",
                time
            )));
        }
        out.push(time);
    }
    out.sort();
    out.dedup();
    Ok(serde_json::to_string(&out).map_err(anyhow::Error::from)?)
}

const LIKE_ESCAPE: char = '\\';

/// `%term%` with the term's own wildcards matched literally.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub fn filtered_appointments<'a>(
    filters: &'a AppointFilters,
) -> appointments::BoxedQuery<'a, Sqlite> {
    let mut query = appointments::table
        .filter(appointments::clinic_id.eq(&filters.clinic_id))
        .into_boxed();
    if let Some(doctor_id) = &filters.doctor_id {
        query = query.filter(appointments::doctor_id.eq(doctor_id));
    }
    if let Some(status) = &filters.status {
        query = query.filter(appointments::status.eq(status));
    }
    if let Some(name) = &filters.patient_name {
        query = query.filter(
            appointments::patient_name
                .like(contains_pattern(name))
                .escape(LIKE_ESCAPE),
        );
    }
    // dates are stored as YYYY-MM-DD, so text order is date order
    if let Some(from) = &filters.date_from {
        query = query.filter(appointments::appointment_date.ge(from));
    }
    if let Some(to) = &filters.date_to {
        query = query.filter(appointments::appointment_date.le(to));
    }
    query
}

pub fn filtered_walk_ins<'a>(filters: &'a WalkInFilters) -> walk_ins::BoxedQuery<'a, Sqlite> {
    let mut query = walk_ins::table
        .filter(walk_ins::clinic_id.eq(&filters.clinic_id))
        .into_boxed();
    if let Some(status) = &filters.status {
        query = query.filter(walk_ins::status.eq(status));
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_are_normalised() {
        let days =
            normalize_days(vec!["Monday".into(), " friday ".into(), "monday".into()]).unwrap();
        assert_eq!(days, r#"["monday","friday"]"#);
        assert!(normalize_days(vec!["funday".into()]).is_err());
    }

    #[test]
    fn search_terms_match_wildcards_literally() {
        assert_eq!(contains_pattern("Jane"), "%Jane%");
        assert_eq!(contains_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(contains_pattern(r"a\b"), r"%a\\b%");
    }

    #[test]
    fn times_are_sorted_and_checked() {
        let times = normalize_times(vec!["14:00".into(), "09:30".into(), "14:00".into()]).unwrap();
        assert_eq!(times, r#"["09:30","14:00"]"#);
        assert!(normalize_times(vec!["9:30".into()]).is_err());
        assert_eq!(normalize_times(vec![]).unwrap(), "[]");
    }
}
