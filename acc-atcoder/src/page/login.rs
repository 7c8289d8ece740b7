use acc_util::select;
use reqwest::StatusCode;
use scraper::{ElementRef, Html};

use crate::service::scrape::{ExtractCsrfToken, GetHtml, Scrape};
use crate::service::Session;
use crate::{Console, Error, Result};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoginPageBuilder;

impl LoginPageBuilder {
    pub const PATH: &'static str = "/login";

    pub fn new() -> Self {
        Self
    }

    pub fn build(self, session: &mut Session, cnsl: &mut Console) -> Result<LoginPage> {
        let (status, html) = self.get_html(session, cnsl)?;
        match status {
            StatusCode::OK => Ok(LoginPage { content: html }),
            _ => Err(Error::msg(format!("Received invalid response : {}", status))),
        }
    }
}

impl GetHtml for LoginPageBuilder {
    fn path(&self) -> String {
        Self::PATH.to_owned()
    }
}

pub struct LoginPage {
    content: Html,
}

impl LoginPage {
    pub fn from_html(content: Html) -> Self {
        Self { content }
    }

    pub fn csrf_token(&self) -> Result<String> {
        self.extract_csrf_token(select!("form[action=\"\"]"))
    }
}

impl Scrape for LoginPage {
    fn elem(&self) -> ElementRef {
        self.content.root_element()
    }
}

impl ExtractCsrfToken for LoginPage {}
