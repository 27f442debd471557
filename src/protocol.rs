use chrono::{SecondsFormat, Utc};
use serde::Serialize;

#[derive(Default, Serialize)]
pub struct SimpleResponse {
    pub success: bool,
}

impl SimpleResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new<S: ToString>(error: &str, message: S) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

/// `{success, data}` wrapper for single-object responses.
#[derive(Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: i64,
    pub count: usize,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

impl PageMeta {
    pub fn new(total: i64, count: usize, limit: i64, offset: i64) -> Self {
        Self {
            total,
            count,
            limit,
            offset,
            has_more: offset + (count as i64) < total,
        }
    }
}

/// Envelope shared by every list endpoint.
#[derive(Serialize)]
pub struct ListResponse<T, F> {
    pub success: bool,
    pub data: Vec<T>,
    pub meta: PageMeta,
    pub filters: F,
    pub timestamp: String,
}

impl<T, F> ListResponse<T, F> {
    pub fn new(data: Vec<T>, total: i64, limit: i64, offset: i64, filters: F) -> Self {
        let meta = PageMeta::new(total, data.len(), limit, offset);
        Self {
            success: true,
            data,
            meta,
            filters,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_more_tracks_the_last_page() {
        assert!(PageMeta::new(10, 5, 5, 0).has_more);
        assert!(!PageMeta::new(10, 5, 5, 5).has_more);
        assert!(!PageMeta::new(0, 0, 50, 0).has_more);
    }
}
