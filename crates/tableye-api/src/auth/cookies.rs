//! 인증 쿠키.
//!
//! `access_token`, `refresh_token`은 HttpOnly이고, `logged_in`은 클라이언트
//! 스크립트가 로그인 상태를 표시할 수 있도록 HttpOnly가 아닙니다.

use axum::http::{header::COOKIE, HeaderMap};

use tableye_core::AuthConfig;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
pub const LOGGED_IN_COOKIE: &str = "logged_in";

const EXPIRED_DATE: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// 쿠키 속성 설정.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub domain: String,
    pub secure: bool,
    /// Access Token 쿠키 수명 (초)
    pub access_max_age: i64,
    /// Refresh Token 쿠키 수명 (초)
    pub refresh_max_age: i64,
}

impl CookieSettings {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            domain: config.cookie_domain.clone(),
            secure: config.cookie_secure,
            access_max_age: config.access_token_minutes * 60,
            refresh_max_age: config.refresh_token_minutes * 60,
        }
    }

    pub fn access_token(&self, token: &str) -> String {
        self.build(ACCESS_TOKEN_COOKIE, token, self.access_max_age, true)
    }

    pub fn refresh_token(&self, token: &str) -> String {
        self.build(REFRESH_TOKEN_COOKIE, token, self.refresh_max_age, true)
    }

    /// `logged_in=true` 플래그 쿠키. 수명은 Access Token과 같습니다.
    pub fn logged_in(&self) -> String {
        self.build(LOGGED_IN_COOKIE, "true", self.access_max_age, false)
    }

    /// 세 쿠키를 즉시 만료시키는 Set-Cookie 값들.
    pub fn cleared(&self) -> [String; 3] {
        [
            self.expire(ACCESS_TOKEN_COOKIE, true),
            self.expire(REFRESH_TOKEN_COOKIE, true),
            self.expire(LOGGED_IN_COOKIE, false),
        ]
    }

    fn build(&self, name: &str, value: &str, max_age: i64, http_only: bool) -> String {
        let mut cookie = format!(
            "{}={}; Max-Age={}; Path=/; Domain={}",
            name, value, max_age, self.domain
        );
        self.append_flags(&mut cookie, http_only);
        cookie
    }

    fn expire(&self, name: &str, http_only: bool) -> String {
        let mut cookie = format!(
            "{}=; Max-Age=0; Expires={}; Path=/; Domain={}",
            name, EXPIRED_DATE, self.domain
        );
        self.append_flags(&mut cookie, http_only);
        cookie
    }

    fn append_flags(&self, cookie: &mut String, http_only: bool) {
        if http_only {
            cookie.push_str("; HttpOnly");
        }
        cookie.push_str("; SameSite=Lax");
        if self.secure {
            cookie.push_str("; Secure");
        }
    }
}

/// `Cookie` 헤더에서 이름으로 값을 찾습니다. 빈 값은 없는 것으로 취급합니다.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn settings(secure: bool) -> CookieSettings {
        CookieSettings {
            domain: "localhost".to_string(),
            secure,
            access_max_age: 15 * 60,
            refresh_max_age: 60 * 60,
        }
    }

    #[test]
    fn test_token_cookies_are_http_only() {
        let s = settings(false);

        let access = s.access_token("abc");
        assert!(access.starts_with("access_token=abc; Max-Age=900;"));
        assert!(access.contains("Path=/"));
        assert!(access.contains("Domain=localhost"));
        assert!(access.contains("HttpOnly"));
        assert!(access.contains("SameSite=Lax"));
        assert!(!access.contains("Secure"));

        let refresh = s.refresh_token("def");
        assert!(refresh.starts_with("refresh_token=def; Max-Age=3600;"));
        assert!(refresh.contains("HttpOnly"));
    }

    #[test]
    fn test_logged_in_cookie_readable_by_script() {
        let cookie = settings(true).logged_in();
        assert!(cookie.starts_with("logged_in=true; Max-Age=900;"));
        assert!(!cookie.contains("HttpOnly"));
        assert!(cookie.ends_with("; Secure"));
    }

    #[test]
    fn test_cleared_cookies_expire_immediately() {
        let cleared = settings(false).cleared();
        let names: Vec<&str> = cleared
            .iter()
            .map(|c| c.split('=').next().unwrap())
            .collect();
        assert_eq!(names, vec!["access_token", "refresh_token", "logged_in"]);
        for cookie in &cleared {
            assert!(cookie.contains("Max-Age=0"));
            assert!(cookie.contains(EXPIRED_DATE));
        }
    }

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("logged_in=true; access_token=tok.en.value; refresh_token="),
        );

        assert_eq!(read_cookie(&headers, "access_token"), Some("tok.en.value"));
        assert_eq!(read_cookie(&headers, "logged_in"), Some("true"));
        assert_eq!(read_cookie(&headers, "refresh_token"), None);
        assert_eq!(read_cookie(&headers, "missing"), None);
        assert_eq!(read_cookie(&HeaderMap::new(), "access_token"), None);
    }
}
