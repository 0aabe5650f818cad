//! Session cookie helpers.
//!
//! The session token travels in an `HttpOnly` cookie named [`AUTH_COOKIE`].

use std::fmt::Write;

use axum::http::{header, HeaderMap, HeaderValue};

pub const AUTH_COOKIE: &str = "jwt";

/// Per-deployment cookie attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSettings {
    /// Emit the `Secure` attribute (HTTPS deployments).
    pub secure: bool,
    pub max_age_secs: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie<'a> {
    pub name: &'a str,
    pub value: &'a str,
    pub max_age_secs: i64,
    pub http_only: bool,
    pub secure: bool,
    pub path: &'a str,
}

impl<'a> SessionCookie<'a> {
    pub fn auth(value: &'a str, settings: CookieSettings) -> Self {
        Self {
            name: AUTH_COOKIE,
            value,
            max_age_secs: settings.max_age_secs,
            http_only: true,
            secure: settings.secure,
            path: "/",
        }
    }

    /// `Set-Cookie` header value.
    pub fn build(&self) -> String {
        let mut cookie = format!("{}={}", self.name, self.value);
        let _ = write!(cookie, "; Max-Age={}", self.max_age_secs);
        let _ = write!(cookie, "; Path={}", self.path);
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str("; SameSite=Lax");
        cookie
    }
}

pub fn set_auth_cookie(headers: &mut HeaderMap, token: &str, settings: CookieSettings) {
    if let Ok(value) = HeaderValue::from_str(&SessionCookie::auth(token, settings).build()) {
        headers.insert(header::SET_COOKIE, value);
    }
}

/// Expire the session cookie on the client.
pub fn clear_auth_cookie(headers: &mut HeaderMap, settings: CookieSettings) {
    let cleared = SessionCookie {
        max_age_secs: 0,
        ..SessionCookie::auth("", settings)
    };
    if let Ok(value) = HeaderValue::from_str(&cleared.build()) {
        headers.insert(header::SET_COOKIE, value);
    }
}

pub fn get_cookie_value(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name.trim() == cookie_name).then(|| value.trim().to_owned())
        })
}
