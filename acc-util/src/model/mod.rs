mod answer;
mod sample;
mod submission;
mod task;

pub use answer::*;
pub use sample::*;
pub use submission::*;
pub use task::*;

pub type LangId = String;

pub type LangIdRef<'a> = &'a str;
