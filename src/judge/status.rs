use std::cmp::max;
use std::fmt;
use std::io::Write as _;
use std::time::Duration;

use acc_util::console::{sty_dim, sty_g, sty_r, sty_y};
use acc_util::model::Sample;
use getset::{CopyGetters, Getters};
use serde::Serialize;

use crate::{Console, Result};

/// Outcome of one sample run. Later variants are worse.
#[derive(
    Serialize,
    IntoStaticStr,
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum TestStatus {
    Ok,
    Wa,
    Tle,
    Re,
    Ce,
}

impl TestStatus {
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.into())
    }
}

#[derive(Serialize, Getters, CopyGetters, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TestResult {
    #[get = "pub"]
    sample_name: String,
    #[get_copy = "pub"]
    status: TestStatus,
    #[get = "pub"]
    input: String,
    #[get = "pub"]
    expected: String,
    #[get = "pub"]
    actual: String,
    /// Stderr of the failed process, or the reason it could not run.
    #[get = "pub"]
    message: String,
    #[serde(with = "humantime_serde")]
    #[get_copy = "pub"]
    elapsed: Duration,
}

impl TestResult {
    pub fn new(
        sample: &Sample,
        status: TestStatus,
        actual: String,
        message: String,
        elapsed: Duration,
    ) -> Self {
        Self {
            sample_name: sample.name().to_owned(),
            status,
            input: sample.input().to_owned(),
            expected: sample.output().to_owned(),
            actual,
            message,
            elapsed,
        }
    }

    /// The single result of a run whose build failed.
    pub fn compile_error(message: String, elapsed: Duration) -> Self {
        Self {
            sample_name: "(build)".to_owned(),
            status: TestStatus::Ce,
            input: String::new(),
            expected: String::new(),
            actual: String::new(),
            message,
            elapsed,
        }
    }

    pub fn describe(&self, cnsl: &mut Console) -> Result<()> {
        match self.status {
            TestStatus::Ok | TestStatus::Tle => {}
            TestStatus::Wa => {
                writeln!(cnsl, "{}", sty_dim("input:"))?;
                write!(cnsl, "{}", self.input)?;
                writeln!(cnsl, "{}", sty_dim("expected:"))?;
                write!(cnsl, "{}", self.expected)?;
                writeln!(cnsl, "{}", sty_dim("actual:"))?;
                write!(cnsl, "{}", self.actual)?;
            }
            TestStatus::Re | TestStatus::Ce => write!(cnsl, "{}", self.message)?,
        }
        Ok(())
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let status = match self.status {
            TestStatus::Ok => sty_g(self.status),
            TestStatus::Tle => sty_y(self.status),
            _ => sty_r(self.status),
        };
        write!(
            f,
            "{} {:3} ({}ms)",
            self.sample_name,
            status,
            self.elapsed.as_millis()
        )
    }
}

#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq, Hash)]
struct StatusCount {
    ok: usize,
    wa: usize,
    re: usize,
    tle: usize,
    ce: usize,
}

impl StatusCount {
    fn add(&mut self, status: TestStatus) -> &mut Self {
        match status {
            TestStatus::Ok => self.ok += 1,
            TestStatus::Wa => self.wa += 1,
            TestStatus::Re => self.re += 1,
            TestStatus::Tle => self.tle += 1,
            TestStatus::Ce => self.ce += 1,
        }
        self
    }

    fn total(&self) -> usize {
        self.ok + self.wa + self.re + self.tle + self.ce
    }
}

#[derive(Serialize, Getters, CopyGetters, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TotalStatus {
    #[get_copy = "pub"]
    status: TestStatus,
    count: StatusCount,
    #[get = "pub"]
    results: Vec<TestResult>,
}

impl TotalStatus {
    pub fn new(results: Vec<TestResult>) -> Self {
        let (status, count) = results.iter().fold(
            (TestStatus::Ok, StatusCount::default()),
            |(status, mut count), result| {
                count.add(result.status());
                (max(status, result.status()), count)
            },
        );

        Self {
            status,
            count,
            results,
        }
    }
}

impl fmt::Display for TotalStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:3} (OK: {}/{t}, WA: {}/{t}, RE: {}/{t}, TLE: {}/{t}, CE: {}/{t})",
            Into::<&'static str>::into(self.status),
            self.count.ok,
            self.count.wa,
            self.count.re,
            self.count.tle,
            self.count.ce,
            t = self.count.total()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, status: TestStatus) -> TestResult {
        let sample = Sample::new(name, "1\n", "1\n");
        TestResult::new(&sample, status, "1\n".into(), String::new(), Duration::from_millis(3))
    }

    #[test]
    fn test_total_status() {
        let total = TotalStatus::new(vec![
            result("1", TestStatus::Ok),
            result("2", TestStatus::Re),
            result("3", TestStatus::Wa),
        ]);
        assert_eq!(total.status(), TestStatus::Re);
        assert_eq!(
            total.to_string(),
            "RE  (OK: 1/3, WA: 1/3, RE: 1/3, TLE: 0/3, CE: 0/3)"
        );
    }

    #[test]
    fn test_total_status_all_ok() {
        let total = TotalStatus::new(vec![result("1", TestStatus::Ok)]);
        assert!(total.status().is_ok());
        let total = TotalStatus::new(vec![]);
        assert!(total.status().is_ok());
    }

    #[test]
    fn test_describe_wrong_answer() -> anyhow::Result<()> {
        let sample = Sample::new("1", "4\n", "5\n");
        let result = TestResult::new(
            &sample,
            TestStatus::Wa,
            "4\n".into(),
            String::new(),
            Duration::from_millis(1),
        );
        let mut cnsl = Console::buf();
        result.describe(&mut cnsl)?;
        let output = cnsl.take_output()?;
        assert!(output.contains("expected:"));
        assert!(output.contains("5\n"));
        assert!(output.contains("4\n"));
        Ok(())
    }
}
