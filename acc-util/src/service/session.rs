use std::io::Write as _;
use std::time::Duration;

use anyhow::Context as _;
use getset::{CopyGetters, Getters};
use lazy_static::lazy_static;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::redirect::Policy;
use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};

use crate::service::CookieJar;
use crate::{AccError, Console, Result};

lazy_static! {
    static ref DEFAULT_BASE_URL: Url = Url::parse("https://atcoder.jp/").unwrap();
}

static USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Serialize, Deserialize, Getters, CopyGetters, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    #[serde(with = "url_string")]
    #[get = "pub"]
    base_url: Url,
    #[serde(with = "humantime_serde")]
    #[get_copy = "pub"]
    timeout: Duration,
}

impl SessionConfig {
    pub fn new(base_url: Url, timeout: Duration) -> Self {
        Self { base_url, timeout }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.clone(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// An HTTP session with the judge.
///
/// Relative paths are resolved against the base url. Cookies received in any response are
/// kept for the lifetime of the session and sent with every following request. Redirects
/// are not followed so that cookies of redirect responses are not lost.
#[derive(Debug)]
pub struct Session {
    client: Client,
    base_url: Url,
    jar: CookieJar,
}

impl Session {
    pub fn new(conf: &SessionConfig) -> Result<Self> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(conf.timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Could not build http client")?;
        Ok(Self {
            client,
            base_url: conf.base_url.clone(),
            jar: CookieJar::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn jar(&self) -> &CookieJar {
        &self.jar
    }

    pub fn resolve(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|_| {
            AccError::Parse {
                what: "url path",
                input: path.to_owned(),
            }
            .into()
        })
    }

    pub fn request(&mut self, method: Method, path: &str) -> Result<SessionRequest> {
        let url = self.resolve(path)?;
        let inner = self.client.request(method, url);
        Ok(SessionRequest {
            inner,
            session: self,
        })
    }

    pub fn get(&mut self, path: &str) -> Result<SessionRequest> {
        self.request(Method::GET, path)
    }

    pub fn post(&mut self, path: &str) -> Result<SessionRequest> {
        self.request(Method::POST, path)
    }
}

pub struct SessionRequest<'a> {
    inner: RequestBuilder,
    session: &'a mut Session,
}

impl SessionRequest<'_> {
    pub fn form<T: Serialize + ?Sized>(mut self, form: &T) -> Self {
        self.inner = self.inner.form(form);
        self
    }

    /// Sends the request with the session cookies and stores cookies of the response.
    pub fn send(self, cnsl: &mut Console) -> Result<Response> {
        let Self { inner, session } = self;
        let mut req = inner.build().context("Could not build request")?;
        session
            .jar
            .load_into(&mut req)
            .context("Could not load cookies into request")?;
        write!(cnsl, "{:7} {} ... ", req.method().as_str(), req.url()).unwrap_or(());
        let result = session.client.execute(req).map_err(AccError::Transport);
        match &result {
            Ok(res) => writeln!(cnsl, "{}", res.status()),
            Err(_) => writeln!(cnsl, "failed"),
        }
        .unwrap_or(());
        let res = result?;
        session.jar.store_from(&res);
        Ok(res)
    }
}

mod url_string {
    use reqwest::Url;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(url: &Url, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(url.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Url, D::Error> {
        Url::parse(&String::deserialize(deserializer)?).map_err(de::Error::custom)
    }
}
