#![warn(clippy::all)]

pub mod abs_path;
pub mod console;
mod error;
mod macros;
pub mod model;
pub mod service;
#[doc(hidden)]
pub mod test_server;

pub use console::Console;
pub use error::AccError;

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;
