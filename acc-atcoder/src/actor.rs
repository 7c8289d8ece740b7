use std::io::Write as _;

use acc_util::AccError;
use anyhow::Context as _;
use getset::Getters;
use maplit::hashmap;

use crate::model::{Answer, Sample, Submission, Task};
use crate::page::{LoginPageBuilder, SubmissionsPageBuilder, TaskPageBuilder};
use crate::poll::{CancelToken, PollConfig, Poller};
use crate::service::{ResponseExt as _, Session, SessionConfig};
use crate::{Console, Result};

/// Proof of a successful login, held by the actor for the rest of the process.
#[derive(Getters, Debug, Clone, PartialEq, Eq)]
#[get = "pub"]
pub struct Authenticated {
    username: String,
}

#[derive(Debug)]
pub struct AtcoderActor {
    session: Session,
    auth: Option<Authenticated>,
}

impl AtcoderActor {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            auth: None,
        }
    }

    pub fn with_config(conf: &SessionConfig) -> Result<Self> {
        Ok(Self::new(Session::new(conf)?))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn auth(&self) -> Option<&Authenticated> {
        self.auth.as_ref()
    }

    fn require_auth(&self) -> Result<&Authenticated> {
        self.auth
            .as_ref()
            .ok_or_else(|| AccError::NotAuthenticated.into())
    }

    /// Logs in with a fresh csrf token of the login page.
    pub fn login(&mut self, user: &str, pass: &str, cnsl: &mut Console) -> Result<&Authenticated> {
        let token = LoginPageBuilder::new()
            .build(&mut self.session, cnsl)?
            .csrf_token()
            .context("Could not extract csrf token from login page")?;

        let payload = hashmap!(
            "username" => user,
            "password" => pass,
            "csrf_token" => token.as_str(),
        );
        let res = self
            .session
            .post(LoginPageBuilder::PATH)?
            .form(&payload)
            .send(cnsl)?;

        // failed logins are redirected back to the login page
        let status = res.status();
        let is_success = status.is_success()
            || (status.is_redirection()
                && res
                    .location_url(self.session.base_url())
                    .map(|url| url.path() != LoginPageBuilder::PATH)
                    .unwrap_or(false));
        if !is_success {
            return Err(AccError::Auth { status }.into());
        }

        writeln!(cnsl, "Logged in as {}", user)?;
        Ok(&*self.auth.insert(Authenticated {
            username: user.to_owned(),
        }))
    }

    pub fn fetch_samples(&mut self, task: &Task, cnsl: &mut Console) -> Result<Vec<Sample>> {
        self.require_auth()?;
        let samples = TaskPageBuilder::new(task)
            .build(&mut self.session, cnsl)?
            .extract_samples()
            .with_context(|| format!("Could not extract samples of task : {}", task))?;
        writeln!(cnsl, "Found {} samples of {}", samples.len(), task)?;
        Ok(samples)
    }

    /// Submits `answer` and waits until the judge finishes.
    pub fn submit(
        &mut self,
        task: &Task,
        answer: &Answer,
        poll: &PollConfig,
        cancel: &CancelToken,
        cnsl: &mut Console,
    ) -> Result<Submission> {
        self.require_auth()?;
        let lang_id = answer
            .lang_id()
            .ok_or_else(|| AccError::UnsupportedLanguage("(none)".into()))?;

        let token = TaskPageBuilder::new(task)
            .build(&mut self.session, cnsl)?
            .csrf_token()
            .context("Could not extract csrf token from task page")?;

        let payload = hashmap!(
            "data.TaskScreenName" => task.task_id().as_str(),
            "data.LanguageId" => lang_id,
            "sourceCode" => answer.source_code().as_str(),
            "csrf_token" => token.as_str(),
        );
        let res = self
            .session
            .post(&task.submit_path())?
            .form(&payload)
            .send(cnsl)?;
        let status = res.status();
        if !status.is_success() && !status.is_redirection() {
            return Err(AccError::SubmissionRejected { status }.into());
        }

        self.wait_judge(task, poll, cancel, cnsl)
    }

    fn wait_judge(
        &mut self,
        task: &Task,
        poll: &PollConfig,
        cancel: &CancelToken,
        cnsl: &mut Console,
    ) -> Result<Submission> {
        let pb = cnsl.build_spinner("Judging");
        // request lines would break the spinner
        let mut quiet = Console::sink();
        let session = &mut self.session;
        let result = Poller::new(poll, cancel).wait(|attempt| {
            let submission = SubmissionsPageBuilder::new(task)
                .build(session, &mut quiet)?
                .latest_submission(cnsl)
                .map_err(AccError::VerdictUnreadable)?;
            pb.set_message(&format!("{} (attempt {})", submission.verdict(), attempt));
            Ok(submission)
        });
        pb.finish_and_clear();

        let (submission, attempts) = result?;
        writeln!(
            cnsl,
            "Waiting for judge ... {} after {} attempts",
            submission.verdict(),
            attempts
        )?;
        Ok(submission)
    }
}
