use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Outcome of one request to the authentication API.
///
/// `ok` reflects the HTTP status class only; the body never overrides it.
#[derive(Debug, Clone)]
pub struct AuthResponse {
    pub ok: bool,
    pub status: u16,
    pub body: Value,
    pub access_token: Option<String>,
    pub detail: Option<String>,
}

impl AuthResponse {
    pub fn new(status: u16, body: Value) -> Self {
        let access_token = string_field(&body, "access_token");
        let detail = string_field(&body, "detail");
        Self {
            ok: (200..300).contains(&status),
            status,
            body,
            access_token,
            detail,
        }
    }

    /// Server-supplied error text, if it is usable as a message.
    /// FastAPI validation errors send `detail` as a list, which is not.
    pub fn detail_message(&self) -> Option<&str> {
        self.detail.as_deref().filter(|d| !d.trim().is_empty())
    }

    /// Typed view of a `/token` success body. Only `access_token` is required;
    /// a malformed `token_type` is dropped rather than rejecting the grant.
    pub fn token_grant(&self) -> Option<TokenGrant> {
        let access_token = self.access_token.clone()?;
        Some(TokenGrant {
            access_token,
            token_type: string_field(&self.body, "token_type"),
        })
    }

    /// Typed view of a `/register` success body
    pub fn user_record(&self) -> Option<UserRecord> {
        serde_json::from_value(self.body.clone()).ok()
    }
}

fn string_field(body: &Value, key: &str) -> Option<String> {
    body.get(key).and_then(Value::as_str).map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// The backend serializes naive UTC timestamps (no offset); accept both forms.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<NaiveDateTime>().ok().map(|n| n.and_utc()))
    }))
}
