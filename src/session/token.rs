use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;

/// Read the `exp` claim (seconds since epoch) from a JWT without verifying it.
///
/// The signature is never checked here; the backend does that on every request.
pub fn expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let payload = payload.trim_end_matches('=');

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .ok()?;

    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?;
    exp.as_i64().or_else(|| exp.as_f64().map(|f| f.ceil() as i64))
}

/// A token is usable while its `exp` claim lies strictly in the future.
pub fn is_valid(token: &str, now: i64) -> bool {
    match expiry(token) {
        Some(exp) => exp > now,
        None => false,
    }
}

#[cfg(test)]
pub(crate) fn encode_for_test(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: i64 = 1_760_000_000;

    #[test]
    fn future_expiry_is_valid() {
        let token = encode_for_test(&json!({ "sub": "123", "exp": NOW + 60 }));
        assert!(is_valid(&token, NOW));
        assert_eq!(expiry(&token), Some(NOW + 60));
    }

    #[test]
    fn past_expiry_is_invalid() {
        for exp in [NOW - 1, NOW - 3600, 0] {
            let token = encode_for_test(&json!({ "exp": exp }));
            assert!(!is_valid(&token, NOW), "exp {exp} should be rejected");
        }
    }

    #[test]
    fn expiry_equal_to_now_is_invalid() {
        let token = encode_for_test(&json!({ "exp": NOW }));
        assert!(!is_valid(&token, NOW));
    }

    #[test]
    fn malformed_tokens_are_invalid() {
        let not_json = format!("abc.{}.sig", URL_SAFE_NO_PAD.encode("not json at all"));
        let cases = [
            "",
            "no-dots-here",
            "a.%%%.c",
            not_json.as_str(),
            "onlyheader.",
        ];
        for token in cases {
            assert!(!is_valid(token, NOW), "{token:?} should be rejected");
        }
    }

    #[test]
    fn missing_or_textual_exp_is_invalid() {
        let no_exp = encode_for_test(&json!({ "sub": "123" }));
        let text_exp = encode_for_test(&json!({ "exp": "9999999999" }));
        assert!(!is_valid(&no_exp, NOW));
        assert!(!is_valid(&text_exp, NOW));
    }

    #[test]
    fn padded_and_standard_alphabet_payloads_decode() {
        let claims = json!({ "exp": NOW + 10 }).to_string();
        let padded = base64::engine::general_purpose::STANDARD.encode(&claims);
        let token = format!("h.{padded}.s");
        assert!(is_valid(&token, NOW));
    }

    #[test]
    fn fractional_exp_still_counts_when_ahead_of_now() {
        let ahead = encode_for_test(&json!({ "exp": (NOW as f64) + 0.5 }));
        let behind = encode_for_test(&json!({ "exp": (NOW as f64) - 0.5 }));
        assert!(is_valid(&ahead, NOW));
        assert!(!is_valid(&behind, NOW));
    }
}
