use std::str::FromStr;
use std::time::Duration;

use axum::http::{header::COOKIE, HeaderMap};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

impl FromStr for SameSite {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" => Ok(SameSite::None),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CookieOptions {
    pub secure: bool,
    pub same_site: SameSite,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            secure: false,
            same_site: SameSite::Strict,
        }
    }
}

pub const SESSION_COOKIE_NAME: &str = "sessionId";
pub const SESSION_COOKIE_PATH: &str = "/";
pub const SESSION_COOKIE_MAX_AGE: Duration = Duration::from_secs(86_400);

pub fn build_session_cookie(token: &str, options: CookieOptions) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path={}; Max-Age={}; SameSite={}",
        SESSION_COOKIE_NAME,
        token,
        SESSION_COOKIE_PATH,
        SESSION_COOKIE_MAX_AGE.as_secs(),
        same_site_value(options.same_site)
    );
    if options.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn build_clear_session_cookie(options: CookieOptions) -> String {
    let mut cookie = format!(
        "{}=; HttpOnly; Path={}; Max-Age=0; SameSite={}",
        SESSION_COOKIE_NAME,
        SESSION_COOKIE_PATH,
        same_site_value(options.same_site)
    );
    if options.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn extract_cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|pair| {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next()?.trim();
        let value = parts.next()?.trim();
        if key == name && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// Looks through every `Cookie` header for the session token.
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|raw| extract_cookie_value(raw, SESSION_COOKIE_NAME))
}

fn same_site_value(same_site: SameSite) -> &'static str {
    match same_site {
        SameSite::Lax => "Lax",
        SameSite::Strict => "Strict",
        SameSite::None => "None",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn session_cookie_carries_security_attributes() {
        let cookie = build_session_cookie("abc", CookieOptions::default());
        assert!(cookie.starts_with("sessionId=abc"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(!cookie.contains("Secure"));

        let secure = build_session_cookie(
            "abc",
            CookieOptions {
                secure: true,
                same_site: SameSite::Lax,
            },
        );
        assert!(secure.contains("SameSite=Lax"));
        assert!(secure.ends_with("; Secure"));
    }

    #[test]
    fn clear_cookie_sets_max_age_zero() {
        let cookie = build_clear_session_cookie(CookieOptions::default());
        assert!(cookie.starts_with("sessionId=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn extract_cookie_value_finds_matching_name() {
        let header = "a=1; sessionId=token-value; b=2";
        assert_eq!(
            extract_cookie_value(header, "sessionId").as_deref(),
            Some("token-value")
        );
        assert!(extract_cookie_value(header, "missing").is_none());
        assert!(extract_cookie_value("sessionId=", "sessionId").is_none());
        assert!(extract_cookie_value("garbage", "sessionId").is_none());
    }

    #[test]
    fn session_token_is_found_in_any_cookie_header() {
        let mut headers = HeaderMap::new();
        assert!(session_token_from_headers(&headers).is_none());

        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("sessionId=deadbeef"));
        assert_eq!(
            session_token_from_headers(&headers).as_deref(),
            Some("deadbeef")
        );
    }

    #[test]
    fn same_site_parses_case_insensitively() {
        assert_eq!("strict".parse::<SameSite>(), Ok(SameSite::Strict));
        assert_eq!(" LAX ".parse::<SameSite>(), Ok(SameSite::Lax));
        assert!("sometimes".parse::<SameSite>().is_err());
    }
}
