use acc_util::{select, AccError};
use scraper::{ElementRef, Html};

use crate::model::{Sample, Task};
use crate::page::GetHtmlRestricted;
use crate::service::scrape::{ExtractCsrfToken, GetHtml, Scrape};
use crate::service::Session;
use crate::{Console, Result};

static INPUT_LABELS: &[&str] = &["入力例", "Sample Input"];
static OUTPUT_LABELS: &[&str] = &["出力例", "Sample Output"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPageBuilder<'a> {
    task: &'a Task,
}

impl<'a> TaskPageBuilder<'a> {
    pub fn new(task: &'a Task) -> Self {
        Self { task }
    }

    pub fn build(self, session: &mut Session, cnsl: &mut Console) -> Result<TaskPage> {
        self.get_html_restricted(session, cnsl)
            .map(TaskPage::from_html)
    }
}

impl GetHtml for TaskPageBuilder<'_> {
    fn path(&self) -> String {
        self.task.task_path()
    }
}

impl GetHtmlRestricted for TaskPageBuilder<'_> {}

/// The statement page of a task, which also holds the submission form.
pub struct TaskPage {
    content: Html,
}

impl TaskPage {
    pub fn from_html(content: Html) -> Self {
        Self { content }
    }

    pub fn csrf_token(&self) -> Result<String> {
        self.extract_csrf_token(select!(".form-code-submit"))
    }

    /// Extracts sample cases in document order, named `1`, `2`, ...
    ///
    /// Only the Japanese statement is scanned when the page has both languages.
    pub fn extract_samples(&self) -> Result<Vec<Sample>> {
        let statement = self.select_statement();
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        for part in statement.select(select!(".part")) {
            let label = match part.find_first(select!("h3")) {
                Some(h3) => h3.inner_text(),
                None => continue,
            };
            let label = label.trim();
            let text = match part.find_first(select!("pre")) {
                Some(pre) => pre.inner_text(),
                None => continue,
            };
            if INPUT_LABELS.iter().any(|l| label.starts_with(l)) {
                inputs.push(text);
            } else if OUTPUT_LABELS.iter().any(|l| label.starts_with(l)) {
                outputs.push(text);
            }
        }
        if inputs.len() != outputs.len() {
            return Err(AccError::SampleCountMismatch {
                inputs: inputs.len(),
                outputs: outputs.len(),
            }
            .into());
        }
        let samples = inputs
            .into_iter()
            .zip(outputs)
            .enumerate()
            .map(|(i, (input, output))| Sample::new((i + 1).to_string(), input, output))
            .collect();
        Ok(samples)
    }

    fn select_statement(&self) -> ElementRef {
        let root = self
            .find_first(select!("#task-statement"))
            .unwrap_or_else(|| self.elem());
        root.select(select!("span.lang-ja")).next().unwrap_or(root)
    }
}

impl Scrape for TaskPage {
    fn elem(&self) -> ElementRef {
        self.content.root_element()
    }
}

impl ExtractCsrfToken for TaskPage {}
