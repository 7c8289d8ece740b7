#![warn(clippy::all)]

mod actor;
mod page;
pub mod poll;

use acc_util::{console, model, service};

use crate::console::Console;

pub use actor::{AtcoderActor, Authenticated};
pub use page::{SubmissionsSchema, SUBMISSIONS_SCHEMA_V1};
pub use poll::{CancelToken, PollConfig};

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;
