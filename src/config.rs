use std::time::Duration;

use acc_atcoder::PollConfig;
use acc_util::abs_path::AbsPathBuf;
use acc_util::model::LangId;
use acc_util::service::SessionConfig;
use acc_util::AccError;
use anyhow::Context as _;
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use tera::Tera;

use crate::{Console, Result};

pub static CONFIG_FILE_NAME: &str = "acc.yaml";

pub trait Expand<C: Serialize> {
    fn get_template(&self) -> &str;

    fn expand(&self, context: &C) -> Result<String> {
        let template = self.get_template();
        let ctx =
            tera::Context::from_serialize(context).context("Could not create template context")?;
        Tera::one_off(template, &ctx, false)
            .with_context(|| format!("Could not expand template : {}", template))
    }
}

/// Variables available in command templates.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CmdContext {
    source: String,
    exe: String,
}

impl CmdContext {
    pub fn new(source: &AbsPathBuf, exe: &AbsPathBuf) -> Self {
        Self {
            source: source.to_string(),
            exe: exe.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CmdTempl(String);

impl Expand<CmdContext> for CmdTempl {
    fn get_template(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CmdTempl {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

fn expand_all(templs: &[CmdTempl], ctx: &CmdContext) -> Result<Vec<String>> {
    templs.iter().map(|templ| templ.expand(ctx)).collect()
}

#[derive(Serialize, Deserialize, Getters, Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageConfig {
    /// File extension without the leading dot.
    #[get = "pub"]
    extension: String,
    #[get = "pub"]
    lang_id: LangId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    compile: Option<Vec<CmdTempl>>,
    run: Vec<CmdTempl>,
}

impl LanguageConfig {
    pub fn new(
        extension: &str,
        lang_id: &str,
        compile: Option<&[&str]>,
        run: &[&str],
    ) -> Self {
        Self {
            extension: extension.to_owned(),
            lang_id: lang_id.to_owned(),
            compile: compile.map(|args| args.iter().map(|&arg| arg.into()).collect()),
            run: run.iter().map(|&arg| arg.into()).collect(),
        }
    }

    pub fn has_compile(&self) -> bool {
        self.compile.is_some()
    }

    pub fn compile_command(&self, ctx: &CmdContext) -> Result<Option<Vec<String>>> {
        self.compile
            .as_ref()
            .map(|templs| expand_all(templs, ctx))
            .transpose()
    }

    pub fn run_command(&self, ctx: &CmdContext) -> Result<Vec<String>> {
        expand_all(&self.run, ctx)
    }
}

fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig::new(
            "go",
            "4026",
            Some(&["go", "build", "-o", "{{ exe }}", "{{ source }}"]),
            &["{{ exe }}"],
        ),
        LanguageConfig::new(
            "cpp",
            "4003",
            Some(&["g++", "-std=gnu++17", "-O2", "-o", "{{ exe }}", "{{ source }}"]),
            &["{{ exe }}"],
        ),
        LanguageConfig::new(
            "rs",
            "4050",
            Some(&["rustc", "--edition", "2018", "-O", "-o", "{{ exe }}", "{{ source }}"]),
            &["{{ exe }}"],
        ),
        LanguageConfig::new("py", "4006", None, &["python3", "{{ source }}"]),
    ]
}

#[derive(Serialize, Deserialize, CopyGetters, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(default)]
#[get_copy = "pub"]
pub struct JudgeConfig {
    /// Wall-clock limit of each sample run.
    #[serde(with = "humantime_serde")]
    timeout: Duration,
    #[serde(with = "humantime_serde")]
    compile_timeout: Duration,
}

impl JudgeConfig {
    pub fn new(timeout: Duration, compile_timeout: Duration) -> Self {
        Self {
            timeout,
            compile_timeout,
        }
    }
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2),
            compile_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Serialize, Deserialize, Getters, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
#[get = "pub"]
pub struct Config {
    session: SessionConfig,
    poll: PollConfig,
    judge: JudgeConfig,
    languages: Vec<LanguageConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            poll: PollConfig::default(),
            judge: JudgeConfig::default(),
            languages: default_languages(),
        }
    }
}

impl Config {
    pub fn new(
        session: SessionConfig,
        poll: PollConfig,
        judge: JudgeConfig,
        languages: Vec<LanguageConfig>,
    ) -> Self {
        Self {
            session,
            poll,
            judge,
            languages,
        }
    }

    /// Loads `path`, or the config file found in the current directory or its ancestors.
    ///
    /// Falls back to the default config when no file is found.
    pub fn load(path: Option<&AbsPathBuf>, cnsl: &mut Console) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path, cnsl),
            None => Self::search(&AbsPathBuf::cwd()?, cnsl),
        }
    }

    pub fn search(cwd: &AbsPathBuf, cnsl: &mut Console) -> Result<Self> {
        match cwd.search_dir_contains(CONFIG_FILE_NAME) {
            Some(dir) => Self::load_from(&dir.join(CONFIG_FILE_NAME), cnsl),
            None => {
                cnsl.warn(&format!(
                    "Could not find {} in {} or its ancestors. Using default config.",
                    CONFIG_FILE_NAME, cwd
                ))?;
                Ok(Self::default())
            }
        }
    }

    fn load_from(path: &AbsPathBuf, cnsl: &mut Console) -> Result<Self> {
        path.load_pretty(
            |file| serde_yaml::from_reader(file).context("Could not parse config file"),
            cnsl,
        )
    }

    pub fn lang_id_of(&self, extension: &str) -> Option<LangId> {
        self.find_language(extension)
            .map(|lang| lang.lang_id.clone())
    }

    /// Returns the language of a source file, looked up by its extension.
    pub fn language_for(&self, source: &AbsPathBuf) -> Result<&LanguageConfig> {
        let extension = source.extension().unwrap_or("");
        self.find_language(extension)
            .ok_or_else(|| AccError::UnsupportedLanguage(extension.to_owned()).into())
    }

    fn find_language(&self, extension: &str) -> Option<&LanguageConfig> {
        self.languages
            .iter()
            .find(|lang| lang.extension == extension)
    }
}
