use std::fmt;
use std::io::Write as _;
use std::path::PathBuf;

use acc_atcoder::AtcoderActor;
use acc_util::abs_path::AbsPathBuf;
use acc_util::model::Task;
use serde::Serialize;
use structopt::StructOpt;

use crate::cmd::{login, Outcome, Run};
use crate::judge::{Judge, TotalStatus};
use crate::{Config, Console, Result};

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct TestOpt {
    /// Source file to test
    #[structopt(name = "file", parse(from_os_str))]
    file: PathBuf,
    /// Url of the task, like https://atcoder.jp/contests/abc100/tasks/abc100_a
    #[structopt(name = "url")]
    url: String,
}

impl Run for TestOpt {
    fn run(&self, conf: &Config, cnsl: &mut Console) -> Result<Box<dyn Outcome>> {
        let task = Task::from_url(&self.url, conf.session().base_url())?;
        let source = AbsPathBuf::from_cwd(&self.file)?;
        conf.language_for(&source)?;

        let mut actor = AtcoderActor::with_config(conf.session())?;
        login(&mut actor, cnsl)?;
        let samples = actor.fetch_samples(&task, cnsl)?;

        let results = Judge::new(conf).run_local_tests(&source, &samples, cnsl)?;
        let total = TotalStatus::new(results);
        writeln!(cnsl)?;

        Ok(Box::new(TestOutcome::new(task, total)))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TestOutcome {
    task: Task,
    total: TotalStatus,
}

impl TestOutcome {
    pub fn new(task: Task, total: TotalStatus) -> Self {
        Self { task, total }
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for result in self.total.results() {
            writeln!(f, "{}", result)?;
        }
        write!(f, "{}", self.total)
    }
}

impl Outcome for TestOutcome {
    fn is_error(&self) -> bool {
        !self.total.status().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use acc_util::AccError;

    use super::*;

    #[test]
    fn test_reject_unsupported_language_before_login() {
        let opt = TestOpt {
            file: "Main.kt".into(),
            url: "https://atcoder.jp/contests/abc100/tasks/abc100_a".into(),
        };
        let mut cnsl = Console::buf();
        let err = opt.run(&Config::default(), &mut cnsl).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AccError>(),
            Some(AccError::UnsupportedLanguage(_))
        ));
    }
}
