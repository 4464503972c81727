use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Maximum length for response bodies quoted in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &[u8]) -> String {
        let text = String::from_utf8_lossy(body);
        if text.len() <= MAX_ERROR_BODY_LENGTH {
            return text.into_owned();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &text[..end], text.len())
    }

    /// Build the error for a body that could not be parsed as JSON
    pub fn unparseable_body(status: reqwest::StatusCode, body: &[u8]) -> Self {
        if body.is_empty() {
            ApiError::InvalidResponse(format!("Status {}: empty body", status))
        } else {
            ApiError::InvalidResponse(format!("Status {}: {}", status, Self::truncate_body(body)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparseable_body_quotes_short_body() {
        let err = ApiError::unparseable_body(reqwest::StatusCode::BAD_GATEWAY, b"<html>oops</html>");
        let msg = err.to_string();
        assert!(msg.contains("502"));
        assert!(msg.contains("<html>oops</html>"));
    }

    #[test]
    fn test_unparseable_body_truncates_long_body() {
        let body = "x".repeat(2000);
        let err = ApiError::unparseable_body(reqwest::StatusCode::OK, body.as_bytes());
        let msg = err.to_string();
        assert!(msg.contains("truncated, 2000 total bytes"));
        assert!(msg.len() < 700);
    }

    #[test]
    fn test_unparseable_body_empty() {
        let err = ApiError::unparseable_body(reqwest::StatusCode::NO_CONTENT, b"");
        assert!(err.to_string().contains("empty body"));
    }
}
