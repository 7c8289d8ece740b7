use std::fmt;
use std::path::PathBuf;

use acc_atcoder::{AtcoderActor, CancelToken};
use acc_util::abs_path::AbsPathBuf;
use acc_util::model::{Answer, Submission, Task};
use acc_util::AccError;
use anyhow::Context as _;
use serde::Serialize;
use structopt::StructOpt;

use crate::cmd::{login, Outcome, Run};
use crate::{Config, Console, Error, Result};

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct SubmitOpt {
    /// Source file to submit
    #[structopt(name = "file", parse(from_os_str))]
    file: PathBuf,
    /// Url of the task, like https://atcoder.jp/contests/abc100/tasks/abc100_a
    #[structopt(name = "url")]
    url: String,
}

impl Run for SubmitOpt {
    fn run(&self, conf: &Config, cnsl: &mut Console) -> Result<Box<dyn Outcome>> {
        let task = Task::from_url(&self.url, conf.session().base_url())?;

        let source = AbsPathBuf::from_cwd(&self.file)?;
        let answer = Answer::load(&source, |ext| conf.lang_id_of(ext), cnsl)
            .context("Could not load source file")?;
        if answer.lang_id().is_none() {
            let ext = source.extension().unwrap_or("").to_owned();
            return Err(AccError::UnsupportedLanguage(ext).into());
        }
        if answer.source_code().is_empty() {
            return Err(Error::msg("Found empty source file"));
        }

        let mut actor = AtcoderActor::with_config(conf.session())?;
        login(&mut actor, cnsl)?;
        let submission = actor
            .submit(&task, &answer, conf.poll(), &CancelToken::new(), cnsl)
            .with_context(|| format!("Could not submit to {}", task))?;

        Ok(Box::new(SubmitOutcome::new(task, submission)))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubmitOutcome {
    task: Task,
    submission: Submission,
}

impl SubmitOutcome {
    pub fn new(task: Task, submission: Submission) -> Self {
        Self { task, submission }
    }
}

impl fmt::Display for SubmitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Task         : {}", self.task)?;
        write!(f, "{}", self.submission)
    }
}

impl Outcome for SubmitOutcome {
    fn is_error(&self) -> bool {
        !self.submission.verdict().is_accepted()
    }
}
