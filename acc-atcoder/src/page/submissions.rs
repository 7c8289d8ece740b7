use acc_util::{select, AccError};
use reqwest::Url;
use scraper::{ElementRef, Html};

use crate::model::{Scores, Submission, Task, Verdict};
use crate::page::GetHtmlRestricted;
use crate::service::scrape::{parse_leading_u64, GetHtml, Scrape};
use crate::service::Session;
use crate::{Console, Result};

/// Layout of the submissions table. Column indices are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionsSchema {
    pub version: &'static str,
    /// Number of header columns.
    pub columns: usize,
    pub code_size: usize,
    pub status: usize,
    pub time: usize,
    pub memory: usize,
    /// Detail link of a judged row with scores.
    pub judged_detail: usize,
    /// Detail link of a waiting or compile error row, which has no score cells.
    pub unjudged_detail: usize,
    pub pending_class: &'static str,
}

pub const SUBMISSIONS_SCHEMA_V1: SubmissionsSchema = SubmissionsSchema {
    version: "v1",
    columns: 10,
    code_size: 6,
    status: 7,
    time: 8,
    memory: 9,
    judged_detail: 10,
    unjudged_detail: 8,
    pending_class: "waiting-judge",
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionsPageBuilder<'a> {
    task: &'a Task,
}

impl<'a> SubmissionsPageBuilder<'a> {
    pub fn new(task: &'a Task) -> Self {
        Self { task }
    }

    pub fn build(self, session: &mut Session, cnsl: &mut Console) -> Result<SubmissionsPage> {
        let base_url = session.base_url().clone();
        self.get_html_restricted(session, cnsl)
            .map(|html| SubmissionsPage::from_html(html, base_url))
    }
}

impl GetHtml for SubmissionsPageBuilder<'_> {
    fn path(&self) -> String {
        self.task.submissions_me_path()
    }
}

impl GetHtmlRestricted for SubmissionsPageBuilder<'_> {}

/// The list of the user's own submissions, newest first.
pub struct SubmissionsPage {
    content: Html,
    base_url: Url,
}

impl SubmissionsPage {
    pub fn from_html(content: Html, base_url: Url) -> Self {
        Self { content, base_url }
    }

    pub fn latest_submission(&self, cnsl: &mut Console) -> Result<Submission> {
        self.latest_submission_with(&SUBMISSIONS_SCHEMA_V1, cnsl)
    }

    pub fn latest_submission_with(
        &self,
        schema: &SubmissionsSchema,
        cnsl: &mut Console,
    ) -> Result<Submission> {
        let table = self
            .find_first(select!(".panel-submission table"))
            .ok_or(AccError::NotFound("submissions table"))?;
        if let Some(header) = table.select(select!("thead tr")).next() {
            let n_columns = header.select(select!("th")).count();
            if n_columns != schema.columns {
                return Err(mismatch(
                    schema,
                    format!("expected {} columns but found {}", schema.columns, n_columns),
                ));
            }
        }
        let row = table
            .select(select!("tbody > tr"))
            .next()
            .map(RowElem)
            .ok_or(AccError::NotFound("submission"))?;
        row.decode(schema, &self.base_url, cnsl)
    }
}

impl Scrape for SubmissionsPage {
    fn elem(&self) -> ElementRef {
        self.content.root_element()
    }
}

fn mismatch(schema: &SubmissionsSchema, detail: String) -> anyhow::Error {
    AccError::SchemaMismatch {
        version: schema.version,
        detail,
    }
    .into()
}

fn decode_label(label: &str) -> Verdict {
    match label {
        "WJ" | "WR" => Verdict::Pending,
        "AC" => Verdict::Accepted,
        "WA" => Verdict::WrongAnswer,
        "TLE" => Verdict::TimeLimitExceeded,
        "MLE" => Verdict::MemoryLimitExceeded,
        "RE" => Verdict::RuntimeError,
        "CE" => Verdict::CompileError,
        _ => Verdict::Unknown(label.to_owned()),
    }
}

struct RowElem<'a>(ElementRef<'a>);

impl<'a> RowElem<'a> {
    fn decode(
        &self,
        schema: &SubmissionsSchema,
        base_url: &Url,
        cnsl: &mut Console,
    ) -> Result<Submission> {
        let cells: Vec<ElementRef<'a>> = self.0.select(select!("td")).collect();
        let cell = |column: usize| {
            cells.get(column - 1).copied().ok_or_else(|| {
                mismatch(
                    schema,
                    format!(
                        "column {} is required but the row has {} cells",
                        column,
                        cells.len()
                    ),
                )
            })
        };

        let status = cell(schema.status)?;
        let is_waiting = status
            .value()
            .classes()
            .any(|class| class == schema.pending_class);
        let label_text = status
            .find_first(select!("span"))
            .unwrap_or(status)
            .inner_text();
        let label = label_text.split_whitespace().next().unwrap_or("");
        let verdict = if is_waiting {
            Verdict::Pending
        } else if label.is_empty() {
            return Err(AccError::Parse {
                what: "verdict label",
                input: status.inner_text().trim().to_owned(),
            }
            .into());
        } else {
            decode_label(label)
        };
        if let Verdict::Unknown(label) = &verdict {
            cnsl.warn(&format!("Found unknown verdict label : {}", label))?;
        }

        let code_size = parse_leading_u64(&cell(schema.code_size)?.inner_text(), "code size")?;
        let (scores, detail_column) = if verdict.has_scores() {
            let time_ms = parse_leading_u64(&cell(schema.time)?.inner_text(), "time score")?;
            let memory_kb =
                parse_leading_u64(&cell(schema.memory)?.inner_text(), "memory score")?;
            (Some(Scores::new(time_ms, memory_kb)), schema.judged_detail)
        } else {
            (None, schema.unjudged_detail)
        };
        let detail_url = if verdict.has_scores() {
            self.extract_detail_url(cell(detail_column)?, base_url)?
        } else {
            match cells.get(detail_column - 1) {
                Some(detail) => self.extract_detail_url(*detail, base_url)?,
                None => None,
            }
        };

        Ok(Submission::new(verdict, code_size, scores, detail_url))
    }

    fn extract_detail_url(&self, cell: ElementRef, base_url: &Url) -> Result<Option<Url>> {
        let href = match cell
            .find_first(select!("a"))
            .and_then(|a| a.value().attr("href"))
        {
            Some(href) => href,
            None => return Ok(None),
        };
        base_url.join(href).map(Some).map_err(|_| {
            AccError::Parse {
                what: "detail url",
                input: href.to_owned(),
            }
            .into()
        })
    }
}
