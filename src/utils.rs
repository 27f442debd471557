use actix_web::{web, FromRequest, Handler, HttpResponse, Resource, Responder};
use chrono::{NaiveDate, NaiveDateTime};

use crate::error::ApiError;

/// Admin-style handlers: bearer caller plus a JSON body, forwarded to
/// `<name>_impl` and answered with `200` and the returned body.
#[macro_export]
macro_rules! post_funcs {
    ( $( ( $func_name:ident, $request:ty ) ),+ $(,)? ) => {
        $(
            paste::paste! {
                async fn $func_name(
                    pool: web::Data<DbPool>,
                    caller: Caller,
                    info: web::Json<$request>,
                ) -> Result<HttpResponse, ApiError> {
                    let response = [<$func_name _impl>](pool, caller, info.into_inner()).await?;
                    Ok(HttpResponse::Ok().json(response))
                }
            }
        )+
    };
}

pub const DEFAULT_PAGE_LIMIT: i64 = 50;
pub const MAX_PAGE_LIMIT: i64 = 100;

pub fn post_resource<F, Args>(path: &str, handler: F) -> Resource
where
    F: Handler<Args>,
    Args: FromRequest + 'static,
    F::Output: Responder + 'static,
{
    web::resource(path)
        .route(web::post().to(handler))
        .default_service(web::to(method_not_allowed))
}

pub fn get_resource<F, Args>(path: &str, handler: F) -> Resource
where
    F: Handler<Args>,
    Args: FromRequest + 'static,
    F::Output: Responder + 'static,
{
    web::resource(path)
        .route(web::get().to(handler))
        .default_service(web::to(method_not_allowed))
}

pub async fn method_not_allowed() -> Result<HttpResponse, ApiError> {
    Err(ApiError::MethodNotAllowed)
}

pub async fn not_found() -> Result<HttpResponse, ApiError> {
    Err(ApiError::not_found("No such endpoint"))
}

/// Clamps `limit`/`offset` query values into a sane page.
pub fn page_bounds(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

/// Trimmed value, `None` when absent or blank.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trimmed value of a required field, or a validation error naming it.
pub fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    non_blank(value)
        .ok_or_else(|| ApiError::validation(format!("Missing required fields: {}", field)))
}

pub fn parse_date(field: &str, date: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
        ApiError::validation(format!("Wrong format on '{}', expected YYYY-MM-DD", field))
    })
}

pub fn format_time_str(time: &NaiveDateTime) -> String {
    const TIME_FMT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    format!("{}+00:00", time.format(TIME_FMT))
}

/// 24-hour `HH:MM`.
pub fn is_valid_time(time: &str) -> bool {
    let bytes = time.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let hour = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
    let minute = (bytes[3] - b'0') * 10 + (bytes[4] - b'0');
    hour < 24 && minute < 60
}

/// 7 to 15 digits, optional leading `+`, spaces and dashes ignored.
pub fn is_valid_phone(phone: &str) -> bool {
    let phone = phone.trim();
    let rest = phone.strip_prefix('+').unwrap_or(phone);
    let mut digits = 0;
    for c in rest.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' | '(' | ')' => {}
            _ => return false,
        }
    }
    (7..=15).contains(&digits)
}

pub fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((user, domain)) => {
            !user.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn times_must_be_24h_hh_mm() {
        assert!(is_valid_time("09:00"));
        assert!(is_valid_time("23:59"));
        assert!(!is_valid_time("24:00"));
        assert!(!is_valid_time("9:00"));
        assert!(!is_valid_time("09:60"));
        assert!(!is_valid_time("09-00"));
    }

    #[test]
    fn phone_numbers() {
        assert!(is_valid_phone("+15551234567"));
        assert!(is_valid_phone("555-123-4567"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("call me"));
    }

    #[test]
    fn emails() {
        assert!(is_valid_email("jane@example.com"));
        assert!(!is_valid_email("jane.example.com"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn page_bounds_are_clamped() {
        assert_eq!(page_bounds(None, None), (DEFAULT_PAGE_LIMIT, 0));
        assert_eq!(page_bounds(Some(1000), Some(-4)), (MAX_PAGE_LIMIT, 0));
        assert_eq!(page_bounds(Some(0), Some(10)), (1, 10));
    }

    #[test]
    fn dates() {
        assert!(parse_date("appointmentDate", "2025-06-01").is_ok());
        assert!(parse_date("appointmentDate", "2025-02-30").is_err());
        assert!(parse_date("dateFrom", "06/01/2025").is_err());
    }

    #[test]
    fn required_names_the_missing_field() {
        assert_eq!(required(Some(" x ".into()), "name").unwrap(), "x");
        match required(Some("  ".into()), "name") {
            Err(ApiError::Validation(msg)) => assert_eq!(msg, "Missing required fields: name"),
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }
}
