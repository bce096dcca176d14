use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A stored user, keyed by email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub email: String,
    /// bcrypt hash; older files call this field `password`
    #[serde(alias = "password")]
    pub password_hash: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Accepts RFC 3339 timestamps and ISO 8601 ones without an offset, which
/// older files contain; the latter are read as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| serde::de::Error::custom(format!("invalid created_at {raw:?}: {e}")))
}

impl UserRecord {
    pub fn new(email: String, password_hash: String, full_name: Option<String>) -> Self {
        Self {
            email,
            password_hash,
            full_name,
            created_at: Utc::now(),
        }
    }

    /// Overwrite the fields present in `update`.
    pub fn apply(&mut self, update: UserUpdate) {
        if let Some(password_hash) = update.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(full_name) = update.full_name {
            self.full_name = full_name;
        }
    }
}

/// Public view of a user, without the password hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPublic {
    pub email: String,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&UserRecord> for UserPublic {
    fn from(user: &UserRecord) -> Self {
        Self {
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            created_at: user.created_at,
        }
    }
}

impl From<UserRecord> for UserPublic {
    fn from(user: UserRecord) -> Self {
        Self {
            email: user.email,
            full_name: user.full_name,
            created_at: user.created_at,
        }
    }
}

/// Field-by-field update; `None` leaves a field untouched.
///
/// `full_name: Some(None)` clears the name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub password_hash: Option<String>,
    pub full_name: Option<Option<String>>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.password_hash.is_none() && self.full_name.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> UserRecord {
        UserRecord::new("a@x.com".into(), "$2b$04$hash".into(), Some("Ada".into()))
    }

    #[test]
    fn test_public_view_has_no_hash() {
        let json = serde_json::to_value(UserPublic::from(&record())).unwrap();

        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["full_name"], "Ada");
        assert!(json.get("password_hash").is_none());
        assert!(json["created_at"].is_string());
    }

    #[test]
    fn test_apply_overwrites_only_given_fields() {
        let mut user = record();
        let created_at = user.created_at;

        user.apply(UserUpdate {
            full_name: Some(Some("Ada Lovelace".into())),
            ..Default::default()
        });

        assert_eq!(user.full_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(user.password_hash, "$2b$04$hash");
        assert_eq!(user.created_at, created_at);
    }

    #[test]
    fn test_apply_can_clear_full_name() {
        let mut user = record();
        user.apply(UserUpdate {
            full_name: Some(None),
            ..Default::default()
        });
        assert!(user.full_name.is_none());
    }

    #[test]
    fn test_legacy_password_field_is_read() {
        let json = r#"{
            "email": "a@x.com",
            "password": "$2b$12$legacy",
            "full_name": null,
            "created_at": "2025-02-13T10:30:00Z"
        }"#;
        let user: UserRecord = serde_json::from_str(json).unwrap();

        assert_eq!(user.password_hash, "$2b$12$legacy");
        assert!(user.full_name.is_none());
    }

    #[test]
    fn test_timestamp_without_offset_is_read_as_utc() {
        let json = r#"{
            "email": "a@x.com",
            "password": "$2b$12$legacy",
            "full_name": null,
            "created_at": "2025-02-13T10:30:00.123456"
        }"#;
        let user: UserRecord = serde_json::from_str(json).unwrap();

        let expected = DateTime::parse_from_rfc3339("2025-02-13T10:30:00.123456Z").unwrap();
        assert_eq!(user.created_at, expected);
    }

    #[test]
    fn test_timestamp_with_offset_is_normalised_to_utc() {
        let json = r#"{
            "email": "a@x.com",
            "password_hash": "$2b$04$hash",
            "created_at": "2025-02-13T12:30:00+02:00"
        }"#;
        let user: UserRecord = serde_json::from_str(json).unwrap();

        assert_eq!(user.created_at.to_rfc3339(), "2025-02-13T10:30:00+00:00");
    }

    #[test]
    fn test_unparseable_timestamp_is_rejected() {
        let json = r#"{"email": "a@x.com", "password_hash": "h", "created_at": "yesterday"}"#;
        assert!(serde_json::from_str::<UserRecord>(json).is_err());
    }

    #[test]
    fn test_written_timestamp_reads_back() {
        let user = record();
        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(serde_json::from_str::<UserRecord>(&json).unwrap(), user);
    }
}
