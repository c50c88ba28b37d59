//! Session cookie: carries the session id between form submissions.

use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use storyboard_core::SessionId;

pub const COOKIE_NAME: &str = "storyboard_session";

/// Session id from the request's `Cookie` headers, if present and well-formed.
pub fn session_id(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .and_then(|(_, value)| value.parse().ok())
}

/// Attach the cookie for `id` to `res`.
pub fn set(res: &mut Response, id: SessionId) {
    let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", COOKIE_NAME, id);
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        res.headers_mut().append(header::SET_COOKIE, value);
    }
}

/// Expire the session cookie.
pub fn clear(res: &mut Response) {
    let cookie = format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", COOKIE_NAME);
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        res.headers_mut().append(header::SET_COOKIE, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_session_among_other_cookies() {
        let id = SessionId::new();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {}={}; lang=en", COOKIE_NAME, id)).unwrap(),
        );
        assert_eq!(session_id(&headers), Some(id));
    }

    #[test]
    fn malformed_or_missing_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id(&headers), None);
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("storyboard_session=not-a-uuid"),
        );
        assert_eq!(session_id(&headers), None);
    }
}
