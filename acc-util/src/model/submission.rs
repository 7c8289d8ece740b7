use std::fmt;

use getset::{CopyGetters, Getters};
use reqwest::Url;
use serde::{Serialize, Serializer};

/// Judge status of a submission.
///
/// `Pending` is the only non-terminal state. Labels the decoder does not know are kept in
/// `Unknown` so that layout or wording changes of the judge are visible.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    Pending,
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    RuntimeError,
    CompileError,
    Unknown(String),
}

impl Verdict {
    pub fn is_pending(&self) -> bool {
        *self == Self::Pending
    }

    pub fn is_accepted(&self) -> bool {
        *self == Self::Accepted
    }

    /// Whether the judge reports execution scores for this verdict.
    pub fn has_scores(&self) -> bool {
        match self {
            Self::Accepted
            | Self::WrongAnswer
            | Self::TimeLimitExceeded
            | Self::MemoryLimitExceeded
            | Self::RuntimeError => true,
            Self::Pending | Self::CompileError | Self::Unknown(_) => false,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "WJ",
            Self::Accepted => "AC",
            Self::WrongAnswer => "WA",
            Self::TimeLimitExceeded => "TLE",
            Self::MemoryLimitExceeded => "MLE",
            Self::RuntimeError => "RE",
            Self::CompileError => "CE",
            Self::Unknown(label) => label,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Unknown(label) => write!(f, "{} (unknown)", label),
            _ => f.write_str(self.label()),
        }
    }
}

/// Execution scores reported for a judged submission.
#[derive(Serialize, CopyGetters, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[get_copy = "pub"]
pub struct Scores {
    time_ms: u64,
    memory_kb: u64,
}

impl Scores {
    pub fn new(time_ms: u64, memory_kb: u64) -> Self {
        Self { time_ms, memory_kb }
    }
}

/// The latest row of the submissions list.
#[derive(Serialize, Getters, CopyGetters, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Submission {
    #[get = "pub"]
    verdict: Verdict,
    #[get_copy = "pub"]
    code_size: u64,
    #[get_copy = "pub"]
    scores: Option<Scores>,
    #[serde(serialize_with = "serialize_url")]
    #[get = "pub"]
    detail_url: Option<Url>,
}

impl Submission {
    pub fn new(
        verdict: Verdict,
        code_size: u64,
        scores: Option<Scores>,
        detail_url: Option<Url>,
    ) -> Self {
        Self {
            verdict,
            code_size,
            scores,
            detail_url,
        }
    }
}

fn serialize_url<S: Serializer>(url: &Option<Url>, serializer: S) -> Result<S::Ok, S::Error> {
    match url {
        Some(url) => serializer.serialize_some(url.as_str()),
        None => serializer.serialize_none(),
    }
}

impl fmt::Display for Submission {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Status       : {}", self.verdict)?;
        if let Some(scores) = self.scores {
            writeln!(f, "Time Score   : {} ms", scores.time_ms)?;
            writeln!(f, "Memory Score : {} KB", scores.memory_kb)?;
        }
        writeln!(f, "Code Length  : {} Byte", self.code_size)?;
        match &self.detail_url {
            Some(url) => write!(f, "Detail URL   : {}", url),
            None => write!(f, "Detail URL   : -"),
        }
    }
}
