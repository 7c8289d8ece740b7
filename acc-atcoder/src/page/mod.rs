use acc_util::{select, AccError};
use reqwest::StatusCode;
use scraper::{ElementRef, Html};

use crate::service::scrape::{GetHtml, Scrape};
use crate::service::Session;
use crate::{Console, Error, Result};

mod login;
mod submissions;
mod task;

pub use login::{LoginPage, LoginPageBuilder};
pub use submissions::{
    SubmissionsPage, SubmissionsPageBuilder, SubmissionsSchema, SUBMISSIONS_SCHEMA_V1,
};
pub use task::{TaskPage, TaskPageBuilder};

/// Fetches a contest page that is only served to logged in users.
pub trait GetHtmlRestricted: GetHtml {
    fn get_html_restricted(&self, session: &mut Session, cnsl: &mut Console) -> Result<Html> {
        let (status, html) = self.get_html(session, cnsl)?;
        match status {
            StatusCode::OK => Ok(html),
            StatusCode::FOUND => Err(AccError::NotAuthenticated.into()),
            StatusCode::NOT_FOUND if NotFoundPage(&html).is_permission_denied() => Err(Error::msg(
                "Found not participated or not started contest. Participate in the contest and wait until the contest starts.",
            )),
            StatusCode::NOT_FOUND => Err(Error::msg(
                "Could not find task. Check if the contest id and the task id are correct.",
            )),
            _ => Err(Error::msg(format!("Received invalid response : {}", status))),
        }
    }
}

struct NotFoundPage<'a>(&'a Html);

impl NotFoundPage<'_> {
    fn is_permission_denied(&self) -> bool {
        self.find_first(select!(".alert-danger"))
            .map(|elem| elem.inner_text().contains("Permission denied."))
            .unwrap_or(false)
    }
}

impl Scrape for NotFoundPage<'_> {
    fn elem(&self) -> ElementRef {
        self.0.root_element()
    }
}
