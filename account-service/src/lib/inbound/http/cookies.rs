use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::cookie::SameSite;

use crate::account::models::Session;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// HttpOnly, SameSite=Strict cookie scoped to the whole site.
fn session_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .build()
}

/// Set both token cookies for `session`.
pub fn with_session(jar: CookieJar, session: &Session, secure: bool) -> CookieJar {
    jar.add(session_cookie(
        ACCESS_TOKEN_COOKIE,
        session.access_token.clone(),
        secure,
    ))
    .add(session_cookie(
        REFRESH_TOKEN_COOKIE,
        session.refresh_token.clone(),
        secure,
    ))
}

/// Emit removal cookies for both tokens, whether or not the request carried them.
pub fn without_session(jar: CookieJar, secure: bool) -> CookieJar {
    let mut access = session_cookie(ACCESS_TOKEN_COOKIE, String::new(), secure);
    access.make_removal();
    let mut refresh = session_cookie(REFRESH_TOKEN_COOKIE, String::new(), secure);
    refresh.make_removal();

    jar.add(access).add(refresh)
}

#[cfg(test)]
mod tests {
    use axum::http::header::SET_COOKIE;
    use axum::response::IntoResponse;

    use super::*;

    fn set_cookie_headers(jar: CookieJar) -> Vec<String> {
        let response = jar.into_response();
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|value| value.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie(ACCESS_TOKEN_COOKIE, "token".to_string(), true);

        assert_eq!(cookie.value(), "token");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_removal_cookies_are_always_emitted() {
        let headers = set_cookie_headers(without_session(CookieJar::new(), false));

        assert_eq!(headers.len(), 2);
        for header in &headers {
            assert!(header.contains("Max-Age=0"), "{}", header);
            assert!(header.contains("HttpOnly"), "{}", header);
        }
        assert!(headers.iter().any(|h| h.starts_with("accessToken=;")));
        assert!(headers.iter().any(|h| h.starts_with("refreshToken=;")));
    }
}
