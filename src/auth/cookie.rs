use axum::http::{header::InvalidHeaderValue, HeaderValue};

use crate::config::JwtConfig;

pub const SESSION_COOKIE: &str = "jwt";

/// Build a `HttpOnly` session cookie carrying the signed token.
pub fn session_cookie(jwt: &JwtConfig, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = jwt.ttl_minutes * 60;
    let mut cookie =
        format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if jwt.cookie_secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Expire the session cookie immediately.
pub fn clear_session_cookie(jwt: &JwtConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if jwt.cookie_secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(secure: bool) -> JwtConfig {
        JwtConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 5,
            cookie_secure: secure,
        }
    }

    #[test]
    fn session_cookie_format() {
        let value = session_cookie(&test_config(false), "tok-123").expect("valid header");
        assert_eq!(
            value.to_str().unwrap(),
            "jwt=tok-123; Path=/; HttpOnly; SameSite=Lax; Max-Age=300"
        );
    }

    #[test]
    fn session_cookie_marks_secure_when_configured() {
        let value = session_cookie(&test_config(true), "tok-123").expect("valid header");
        assert!(value.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let value = clear_session_cookie(&test_config(false)).expect("valid header");
        let s = value.to_str().unwrap();
        assert!(s.starts_with("jwt=;"));
        assert!(s.contains("Max-Age=0"));
    }
}
