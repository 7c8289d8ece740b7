use std::convert::TryFrom as _;

use cookie::Cookie as RawCookie;
use cookie_store::CookieStore;
use reqwest::blocking::{Request, Response};
use reqwest::header::{HeaderValue, COOKIE, SET_COOKIE};
use reqwest::Url;

use crate::Result;

/// In-memory cookie jar of a session. Lives as long as the process.
#[derive(Debug, Default)]
pub struct CookieJar {
    store: CookieStore,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_into(&self, request: &mut Request) -> Result<()> {
        if let Some(value) = self.request_header(request.url())? {
            request.headers_mut().insert(COOKIE, value);
        }
        Ok(())
    }

    pub fn store_from(&mut self, response: &Response) {
        let url = response.url().clone();
        self.store_set_cookies(response.headers().get_all(SET_COOKIE).iter(), &url);
    }

    /// Builds the value of the `Cookie` header to send to `url`.
    pub fn request_header(&self, url: &Url) -> Result<Option<HeaderValue>> {
        let pairs: Vec<String> = self
            .store
            .matches(url)
            .into_iter()
            .map(|cookie| format!("{}={}", cookie.name(), cookie.value()))
            .collect();
        if pairs.is_empty() {
            return Ok(None);
        }
        Ok(Some(HeaderValue::try_from(pairs.join("; "))?))
    }

    /// Stores cookies from `Set-Cookie` header values. Malformed values are skipped.
    pub fn store_set_cookies<'a>(
        &mut self,
        values: impl Iterator<Item = &'a HeaderValue>,
        url: &Url,
    ) {
        let cookies = values.filter_map(|val| {
            val.to_str()
                .ok()
                .and_then(|cookie_str| RawCookie::parse(cookie_str.to_owned()).ok())
        });
        self.store.store_response_cookies(cookies, url);
    }

    pub fn is_empty(&self) -> bool {
        self.store.iter_any().next().is_none()
    }
}
