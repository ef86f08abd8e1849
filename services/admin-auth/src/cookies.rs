//! Cookie access for the auth flow
//!
//! Handlers talk to cookies through [`CookieStore`] so the session logic does
//! not depend on the web framework. [`JarCookies`] backs it with the axum
//! cookie jar: reads see the request cookies plus anything written during the
//! same request, and writes end up as `Set-Cookie` headers on the response.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Caller supplied cookie attributes
///
/// Security attributes are not configurable: every write is `HttpOnly`,
/// `Secure`, `SameSite=Lax` and scoped to `/`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CookieOptions {
    pub max_age: Option<Duration>,
    pub domain: Option<String>,
}

/// Read/set/remove access to request and response cookies
pub trait CookieStore: Send + Sync {
    /// Current value of a cookie, `None` if absent or removed
    fn get(&self, name: &str) -> Option<String>;

    /// Set or overwrite a cookie
    fn set(&mut self, name: &str, value: &str, options: &CookieOptions);

    /// Expire a cookie on the client
    fn remove(&mut self, name: &str, options: &CookieOptions);
}

/// [`CookieStore`] backed by an axum [`CookieJar`]
#[derive(Debug, Clone, Default)]
pub struct JarCookies {
    jar: CookieJar,
}

impl JarCookies {
    pub fn new(jar: CookieJar) -> Self {
        Self { jar }
    }

    /// Jar to return from the handler so pending writes reach the response
    pub fn into_jar(self) -> CookieJar {
        self.jar
    }

    fn put(&mut self, cookie: Cookie<'static>) {
        self.jar = self.jar.clone().add(cookie);
    }
}

fn is_removal(cookie: &Cookie<'_>) -> bool {
    cookie.max_age() == Some(Duration::ZERO)
}

impl CookieStore for JarCookies {
    fn get(&self, name: &str) -> Option<String> {
        self.jar
            .get(name)
            .filter(|cookie| !is_removal(cookie))
            .map(|cookie| cookie.value().to_string())
    }

    fn set(&mut self, name: &str, value: &str, options: &CookieOptions) {
        let mut cookie = Cookie::build((name.to_string(), value.to_string()))
            .http_only(true)
            .secure(true)
            .same_site(SameSite::Lax)
            .path("/")
            .build();
        if let Some(max_age) = options.max_age {
            cookie.set_max_age(max_age);
        }
        if let Some(domain) = &options.domain {
            cookie.set_domain(domain.clone());
        }
        self.put(cookie);
    }

    fn remove(&mut self, name: &str, options: &CookieOptions) {
        let mut cookie = Cookie::build((name.to_string(), String::new()))
            .max_age(Duration::ZERO)
            .path("/")
            .build();
        if let Some(domain) = &options.domain {
            cookie.set_domain(domain.clone());
        }
        self.put(cookie);
    }
}
