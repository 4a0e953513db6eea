use std::fmt;

use chrono::{DateTime, Utc};

/// A bearer credential obtained from the token endpoint.
///
/// Replaced wholesale on every renewal, never mutated. `expires_at` is fixed
/// at acquisition time; `None` means the expiry could not be determined.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    #[must_use]
    pub fn expires_at_epoch_millis(&self) -> Option<i64> {
        self.expires_at.map(|at| at.timestamp_millis())
    }

    /// An untracked credential never counts as expired.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(expires_at: Option<DateTime<Utc>>) -> Credential {
        Credential {
            access_token: "abc.def.ghi".into(),
            refresh_token: Some("refresh".into()),
            expires_at,
        }
    }

    #[test]
    fn expiry_checks() {
        let now = Utc::now();
        assert!(credential(Some(now - chrono::TimeDelta::seconds(1))).is_expired_at(now));
        assert!(!credential(Some(now + chrono::TimeDelta::seconds(1))).is_expired_at(now));
        assert!(!credential(None).is_expired_at(now));
    }

    #[test]
    fn epoch_millis_matches_expiry() {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(
            credential(Some(at)).expires_at_epoch_millis(),
            Some(1_700_000_000_000)
        );
        assert_eq!(credential(None).expires_at_epoch_millis(), None);
    }

    #[test]
    fn debug_output_hides_tokens() {
        let rendered = format!("{:?}", credential(None));
        assert!(!rendered.contains("abc.def.ghi"));
        assert!(!rendered.contains("\"refresh\""));
        assert_eq!(credential(None).bearer(), "Bearer abc.def.ghi");
    }
}
