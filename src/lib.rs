#![warn(clippy::all)]

#[macro_use]
extern crate strum;

use std::io;
use std::path::PathBuf;

use acc_util::abs_path::AbsPathBuf;
use anyhow::Context as _;
use structopt::StructOpt;
use strum::VariantNames;

mod cmd;
mod config;
mod judge;

pub use acc_util::Console;
pub use cmd::{Cmd, Outcome, Run};
pub use config::{CmdContext, Config, JudgeConfig, LanguageConfig, CONFIG_FILE_NAME};
pub use judge::{Judge, TestResult, TestStatus, TotalStatus};

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;

#[derive(
    EnumString, EnumVariantNames, IntoStaticStr, Debug, Copy, Clone, PartialEq, Eq, Hash,
)]
#[strum(serialize_all = "kebab-case")]
pub enum OutputFormat {
    Default,
    Debug,
    Json,
    Yaml,
}

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct Opt {
    #[structopt(flatten)]
    global_opt: GlobalOpt,
    #[structopt(subcommand)]
    cmd: Cmd,
}

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct GlobalOpt {
    /// Format of the outcome printed to stdout
    #[structopt(
        long,
        global = true,
        default_value = OutputFormat::Default.into(),
        possible_values = OutputFormat::VARIANTS,
    )]
    output: OutputFormat,
    /// Config file, searched from the current directory upward when omitted
    #[structopt(long, global = true, parse(from_os_str))]
    config: Option<PathBuf>,
}

impl Opt {
    /// Runs the command and prints its outcome. Returns whether the outcome is an error.
    pub fn run(&self, cnsl: &mut Console, stdout: &mut dyn io::Write) -> Result<bool> {
        let conf_path = self
            .global_opt
            .config
            .as_ref()
            .map(AbsPathBuf::from_cwd)
            .transpose()?;
        let conf = Config::load(conf_path.as_ref(), cnsl).context("Could not load config")?;

        let outcome = self.cmd.run(&conf, cnsl)?;
        outcome.print(stdout, self.global_opt.output)?;
        Ok(outcome.is_error())
    }
}
