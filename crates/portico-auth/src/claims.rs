use base64::Engine as _;
use chrono::{DateTime, Utc};

use crate::error::AuthError;

/// Decode the JWT `exp` claim without signature validation.
///
/// Only the middle segment is read: base64url JSON, with or without padding.
/// The token is trusted because it came straight from the token endpoint.
///
/// # Errors
///
/// Returns `AuthError::Decode` if the token has no middle segment, the
/// segment is not base64url JSON, or the `exp` claim is missing or invalid.
pub fn decode_expiry(jwt: &str) -> Result<DateTime<Utc>, AuthError> {
    let payload = jwt
        .split('.')
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| AuthError::Decode("invalid JWT format".into()))?;
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::Decode(format!("base64 decode failed: {e}")))?;
    let value: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::Decode(format!("JSON parse failed: {e}")))?;
    let exp = value["exp"]
        .as_i64()
        .ok_or_else(|| AuthError::Decode("missing exp claim".into()))?;
    DateTime::from_timestamp(exp, 0).ok_or_else(|| AuthError::Decode("invalid exp timestamp".into()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_jwt_with_exp(exp: i64) -> String {
        let header = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256"}"#);
        let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode(format!(r#"{{"sub":"service-account-portico","exp":{exp}}}"#));
        let signature = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode("fake_sig");
        format!("{header}.{payload}.{signature}")
    }

    #[test]
    fn decode_expiry_valid_jwt() {
        let future_exp = Utc::now().timestamp() + 3600;
        let jwt = make_jwt_with_exp(future_exp);
        let dt = decode_expiry(&jwt).unwrap();
        assert_eq!(dt.timestamp(), future_exp);
    }

    #[test]
    fn decode_expiry_expired_jwt() {
        let past_exp = Utc::now().timestamp() - 3600;
        let jwt = make_jwt_with_exp(past_exp);
        let dt = decode_expiry(&jwt).unwrap();
        assert!(dt < Utc::now());
    }

    #[test]
    fn decode_expiry_accepts_padded_segment() {
        let payload =
            base64::engine::general_purpose::URL_SAFE.encode(r#"{"exp":1700000000}"#);
        let jwt = format!("h.{payload}.s");
        assert_eq!(decode_expiry(&jwt).unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn decode_expiry_opaque_token() {
        let err = decode_expiry("opaque-access-token").unwrap_err();
        assert!(err.to_string().contains("invalid JWT format"));
    }

    #[test]
    fn decode_expiry_missing_exp_claim() {
        let payload =
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(r#"{"sub":"user_123"}"#);
        let err = decode_expiry(&format!("h.{payload}.s")).unwrap_err();
        assert!(err.to_string().contains("missing exp claim"));
    }

    #[test]
    fn decode_expiry_bad_base64() {
        let err = decode_expiry("header.!!!invalid!!!.signature").unwrap_err();
        assert!(err.to_string().contains("base64 decode failed"));
    }
}
