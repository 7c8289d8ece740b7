use std::fmt;

use getset::Getters;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::{AccError, Result};

/// A task of a contest, identified as in `/contests/{contest_id}/tasks/{task_id}`.
#[derive(Serialize, Deserialize, Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct Task {
    contest_id: String,
    task_id: String,
}

impl Task {
    pub fn new(contest_id: impl Into<String>, task_id: impl Into<String>) -> Self {
        Self {
            contest_id: contest_id.into(),
            task_id: task_id.into(),
        }
    }

    /// Parses a task url. Relative urls are resolved against `base`.
    ///
    /// Anything after the task id in the path, the query and the fragment are ignored.
    pub fn from_url(task_url: &str, base: &Url) -> Result<Self> {
        let parse_err = || AccError::Parse {
            what: "task url",
            input: task_url.to_owned(),
        };
        let url = base.join(task_url).map_err(|_| parse_err())?;
        let segs: Vec<&str> = url.path_segments().ok_or_else(parse_err)?.collect();
        match segs.as_slice() {
            ["contests", contest_id, "tasks", task_id, ..]
                if !contest_id.is_empty() && !task_id.is_empty() =>
            {
                Ok(Self::new(*contest_id, *task_id))
            }
            _ => Err(parse_err().into()),
        }
    }

    pub fn task_path(&self) -> String {
        format!("/contests/{}/tasks/{}", self.contest_id, self.task_id)
    }

    pub fn submit_path(&self) -> String {
        format!("/contests/{}/submit", self.contest_id)
    }

    pub fn submissions_me_path(&self) -> String {
        format!("/contests/{}/submissions/me", self.contest_id)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.contest_id, self.task_id)
    }
}
