//! The uniform response envelope: `{ success, data?, message?, count?,
//! total?, page?, pages? }`.

use serde::{Deserialize, Serialize};

/// Successful API response wrapper. Pagination fields are only present on
/// listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<u64>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            count: None,
            total: None,
            page: None,
            pages: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok(data)
        }
    }

    /// A listing page with its pagination metadata.
    pub fn paginated(items: T, count: usize, total: u64, page: u64, pages: u64) -> Self {
        Self {
            count: Some(count),
            total: Some(total),
            page: Some(page),
            pages: Some(pages),
            ..Self::ok(items)
        }
    }
}

impl ApiResponse<()> {
    /// A bare confirmation, e.g. after a delete.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            count: None,
            total: None,
            page: None,
            pages: None,
        }
    }
}

/// Failure body in the same envelope shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_envelope_omits_absent_fields() {
        let json = serde_json::to_value(ApiResponse::ok("payload")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": true, "data": "payload" })
        );
    }

    #[test]
    fn paginated_envelope_carries_metadata() {
        let json = serde_json::to_value(ApiResponse::paginated(vec![1, 2], 2, 5, 1, 3)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "data": [1, 2],
                "count": 2,
                "total": 5,
                "page": 1,
                "pages": 3,
            })
        );
    }

    #[test]
    fn error_envelope_shape() {
        let json = serde_json::to_value(ErrorResponse::new("Blog not found")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": false, "message": "Blog not found" })
        );
    }
}
