#[cfg(test)]
#[path = "envelope_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;
use serde_json::Value;

pub const DEFAULT_ERROR_MESSAGE: &str = "Request exception, please try again later.";

/// Every REST response is wrapped as `{code, msg|message, data}`, where a
/// `code` of 0 is success.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        return self.code == 0;
    }

    pub fn error_message(&self) -> String {
        let candidates = [&self.msg, &self.message];
        for text in candidates.into_iter().flatten() {
            if !text.is_empty() {
                return text.to_string();
            }
        }

        return DEFAULT_ERROR_MESSAGE.to_string();
    }
}

/// User facing text for HTTP failure statuses.
pub fn status_message(status: u16) -> &'static str {
    match status {
        400 => return "Request parameter error.",
        401 => return "Unauthenticated or your certification has expired, please log in again.",
        403 => return "Unauthorized access.",
        404 => return "Request address error.",
        408 => return "Request timeout.",
        500 => return "Server exception.",
        501 => return "Service not implemented.",
        502 => return "Network exception.",
        503 => return "Service unavailable.",
        504 => return "Network timeout.",
        _ => return DEFAULT_ERROR_MESSAGE,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Page<T> {
        return Page {
            count: 0,
            next: None,
            previous: None,
            results: vec![],
        };
    }
}
