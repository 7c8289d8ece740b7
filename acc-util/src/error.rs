use reqwest::StatusCode;
use thiserror::Error;

/// Failures of the submission and judgement pipeline.
///
/// Functions return `anyhow::Result`; when one of these is the root cause it can be
/// recovered with `err.downcast_ref::<AccError>()`.
#[derive(Error, Debug)]
pub enum AccError {
    #[error("Could not reach the judge server")]
    Transport(#[source] reqwest::Error),
    #[error("Could not parse {what} : {input}")]
    Parse { what: &'static str, input: String },
    #[error("Login failed with response status {status}")]
    Auth { status: StatusCode },
    #[error("Not logged in. Log in before accessing contest pages")]
    NotAuthenticated,
    #[error("Could not find {0} in the page")]
    NotFound(&'static str),
    #[error("Found mismatching number of sample inputs and outputs : (in, out) = ({inputs}, {outputs})")]
    SampleCountMismatch { inputs: usize, outputs: usize },
    #[error("Page layout does not match submissions schema {version} : {detail}")]
    SchemaMismatch {
        version: &'static str,
        detail: String,
    },
    #[error("Submission was rejected with response status {status}")]
    SubmissionRejected { status: StatusCode },
    #[error("Could not read verdict from submissions page")]
    VerdictUnreadable(#[source] anyhow::Error),
    #[error("Judge did not finish after {attempts} attempts")]
    JudgeTimedOut { attempts: usize },
    #[error("Waiting for judge was cancelled")]
    Cancelled,
    #[error("Unsupported language for file extension : {0}")]
    UnsupportedLanguage(String),
}

impl AccError {
    /// Returns the `AccError` at the root of an error chain, if any.
    pub fn find(err: &anyhow::Error) -> Option<&AccError> {
        err.chain().find_map(|cause| cause.downcast_ref::<AccError>())
    }
}
