use actix_web::{
    cookie::{time, Cookie, SameSite},
    http::header::Header,
    HttpRequest,
};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};

pub const SESSION_COOKIE: &str = "induccion_token";

/// Session token from the `induccion_token` cookie, falling back to an
/// `Authorization: Bearer` header.
pub fn token_from_request(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    Authorization::<Bearer>::parse(req)
        .ok()
        .map(|auth| auth.into_scheme().token().to_string())
}

pub fn session_cookie(token: &str, max_age_hours: i64, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(max_age_hours))
        .finish()
}

pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_token_from_cookie() {
        let req = TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE, "from-cookie"))
            .insert_header(("Authorization", "Bearer from-header"))
            .to_http_request();

        assert_eq!(token_from_request(&req).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_token_from_bearer_header() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer from-header"))
            .to_http_request();

        assert_eq!(token_from_request(&req).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_missing_token() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_http_request();

        assert!(token_from_request(&req).is_none());
    }

    #[test]
    fn test_session_cookie_is_http_only() {
        let cookie = session_cookie("abc", 8, true);

        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(8)));
    }

    #[test]
    fn test_removal_cookie_expires_immediately() {
        let cookie = removal_cookie();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
