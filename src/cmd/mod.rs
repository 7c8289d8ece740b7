use std::{fmt, io};

use acc_atcoder::AtcoderActor;
use anyhow::Context as _;
use serde::Serialize;
use structopt::StructOpt;

use crate::{Config, Console, OutputFormat, Result};

mod submit;
mod test;

pub use submit::{SubmitOpt, SubmitOutcome};
pub use test::{TestOpt, TestOutcome};

static USERNAME_ENV: &str = "ATCODER_USERNAME";
static PASSWORD_ENV: &str = "ATCODER_PASSWORD";

pub trait Outcome: OutcomeSerialize {
    fn is_error(&self) -> bool;
}

pub trait OutcomeSerialize: fmt::Display + fmt::Debug {
    fn write_json(&self, writer: &mut dyn io::Write) -> Result<()>;

    fn write_yaml(&self, writer: &mut dyn io::Write) -> Result<()>;

    fn print(&self, stdout: &mut dyn io::Write, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Default => writeln!(stdout, "{}", self)?,
            OutputFormat::Debug => writeln!(stdout, "{:#?}", self)?,
            OutputFormat::Json => {
                self.write_json(stdout)?;
                writeln!(stdout)?;
            }
            OutputFormat::Yaml => {
                self.write_yaml(stdout)?;
                writeln!(stdout)?;
            }
        }
        Ok(())
    }
}

impl<T: Serialize + fmt::Display + fmt::Debug> OutcomeSerialize for T {
    fn write_json(&self, writer: &mut dyn io::Write) -> Result<()> {
        serde_json::to_writer_pretty(writer, self).context("Could not print outcome as json")
    }

    fn write_yaml(&self, writer: &mut dyn io::Write) -> Result<()> {
        serde_yaml::to_writer(writer, self).context("Could not print outcome as yaml")
    }
}

pub trait Run {
    fn run(&self, conf: &Config, cnsl: &mut Console) -> Result<Box<dyn Outcome>>;
}

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub enum Cmd {
    /// Submits source code and waits for the judge
    Submit(SubmitOpt),
    /// Tests source code with the sample cases of a task
    Test(TestOpt),
}

impl Run for Cmd {
    fn run(&self, conf: &Config, cnsl: &mut Console) -> Result<Box<dyn Outcome>> {
        match self {
            Self::Submit(opt) => opt.run(conf, cnsl),
            Self::Test(opt) => opt.run(conf, cnsl),
        }
    }
}

/// Logs in with credentials from the environment, prompting for missing ones.
fn login(actor: &mut AtcoderActor, cnsl: &mut Console) -> Result<()> {
    let user = cnsl
        .get_env_or_prompt_and_read(USERNAME_ENV, "username: ", false)
        .context("Could not read username")?;
    let pass = cnsl
        .get_env_or_prompt_and_read(PASSWORD_ENV, "password: ", true)
        .context("Could not read password")?;
    actor
        .login(&user, &pass, cnsl)
        .context("Could not login")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use acc_util::model::{Sample, Scores, Submission, Task, Verdict};

    use super::*;
    use crate::judge::{TestResult, TestStatus, TotalStatus};

    fn submit_outcome(verdict: Verdict) -> SubmitOutcome {
        let scores = if verdict.has_scores() {
            Some(Scores::new(5, 3568))
        } else {
            None
        };
        SubmitOutcome::new(
            Task::new("abc100", "abc100_a"),
            Submission::new(verdict, 210, scores, None),
        )
    }

    #[test]
    fn test_print_submit_outcome() -> anyhow::Result<()> {
        let outcome = submit_outcome(Verdict::Accepted);
        assert!(!outcome.is_error());

        let mut buf = Vec::new();
        outcome.print(&mut buf, OutputFormat::Json)?;
        let value: serde_json::Value = serde_json::from_slice(&buf)?;
        assert_eq!(value["task"]["task_id"], "abc100_a");
        assert_eq!(value["submission"]["verdict"], "accepted");
        assert_eq!(value["submission"]["scores"]["time_ms"], 5);

        let mut buf = Vec::new();
        outcome.print(&mut buf, OutputFormat::Default)?;
        let output = String::from_utf8(buf)?;
        assert!(output.contains("Status       : AC"));
        assert!(output.contains("Time Score   : 5 ms"));
        Ok(())
    }

    #[test]
    fn test_submit_outcome_is_error() {
        assert!(submit_outcome(Verdict::WrongAnswer).is_error());
        assert!(submit_outcome(Verdict::CompileError).is_error());
        assert!(submit_outcome(Verdict::Unknown("IE".into())).is_error());
    }

    #[test]
    fn test_print_test_outcome() -> anyhow::Result<()> {
        let results = vec![
            TestResult::new(
                &Sample::new("1", "3\n", "3\n"),
                TestStatus::Ok,
                "3\n".into(),
                String::new(),
                Duration::from_millis(2),
            ),
            TestResult::new(
                &Sample::new("2", "4\n", "5\n"),
                TestStatus::Wa,
                "4\n".into(),
                String::new(),
                Duration::from_millis(2),
            ),
        ];
        let outcome = TestOutcome::new(Task::new("abc100", "abc100_a"), TotalStatus::new(results));
        assert!(outcome.is_error());

        let mut buf = Vec::new();
        outcome.print(&mut buf, OutputFormat::Yaml)?;
        let value: serde_yaml::Value = serde_yaml::from_slice(&buf)?;
        assert_eq!(value["total"]["status"].as_str(), Some("WA"));

        let mut buf = Vec::new();
        outcome.print(&mut buf, OutputFormat::Default)?;
        assert!(String::from_utf8(buf)?.contains("OK: 1/2, WA: 1/2"));
        Ok(())
    }
}
