use std::env;
use std::io::{self, BufRead as _, Write};

use anyhow::Context as _;
use console::Term;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

static SPINNER_TICK_INTERVAL_MS: u64 = 80;
static SPINNER_TEMPL: &str = "{spinner:.green} {prefix} [{elapsed_precise}] {msg}";

#[derive(Debug)]
enum Inner {
    Term(Term),
    Buf {
        input: io::BufReader<io::Cursor<String>>,
        output: Vec<u8>,
    },
    Sink(io::Sink),
}

/// Destination of progress messages, warnings and prompts.
///
/// Always writes to stderr when attached to a terminal; outcomes are printed to stdout by
/// the caller.
#[derive(Debug)]
pub struct Console {
    inner: Inner,
}

impl Console {
    pub fn term() -> Self {
        Self {
            inner: Inner::Term(Term::stderr()),
        }
    }

    pub fn buf() -> Self {
        Self {
            inner: Inner::Buf {
                input: io::BufReader::new(io::Cursor::new(String::new())),
                output: Vec::new(),
            },
        }
    }

    pub fn sink() -> Self {
        Self {
            inner: Inner::Sink(io::sink()),
        }
    }

    /// Feeds a line that the next prompt will read. Only affects buffer consoles.
    pub fn write_input(&mut self, s: &str) {
        if let Inner::Buf { ref mut input, .. } = self.inner {
            input.get_mut().get_mut().push_str(s)
        }
    }

    pub fn take_buf(self) -> Option<Vec<u8>> {
        match self.inner {
            Inner::Buf { output: buf, .. } => Some(buf),
            _ => None,
        }
    }

    pub fn take_output(self) -> crate::Result<String> {
        self.take_buf()
            .context("Could not take buf from console")
            .and_then(|buf| Ok(String::from_utf8(buf)?))
    }

    #[inline]
    fn as_mut_write(&mut self) -> &mut dyn Write {
        match self.inner {
            Inner::Term(ref mut w) => w,
            Inner::Buf {
                output: ref mut w, ..
            } => w,
            Inner::Sink(ref mut w) => w,
        }
    }

    pub fn warn(&mut self, message: &str) -> io::Result<()> {
        writeln!(self, "{} {}", sty_y("WARN:"), message)
    }

    pub fn get_env_or_prompt_and_read(
        &mut self,
        env_name: &str,
        prompt: &str,
        is_password: bool,
    ) -> io::Result<String> {
        if let Ok(val) = env::var(env_name) {
            writeln!(
                self,
                "{}{:16} (read from env {})",
                prompt,
                if is_password { "********" } else { &val },
                env_name
            )?;
            return Ok(val);
        };
        self.prompt_and_read(prompt, is_password)
    }

    fn read_user(&mut self, is_password: bool) -> io::Result<String> {
        match self.inner {
            Inner::Term(ref term) => {
                if is_password {
                    term.read_secure_line()
                } else {
                    term.read_line()
                }
            }
            Inner::Buf { ref mut input, .. } => {
                let mut buf = String::new();
                input.read_line(&mut buf)?;
                Ok(buf.trim_end_matches(&['\r', '\n'][..]).to_owned())
            }
            Inner::Sink(_) => Ok(String::from("")),
        }
    }

    fn prompt_and_read(&mut self, prompt: &str, is_password: bool) -> io::Result<String> {
        write!(self, "{}", prompt)?;
        self.flush()?;
        self.read_user(is_password)
    }

    /// Builds a spinner that is only drawn when the console is a terminal.
    pub fn build_spinner(&self, prefix: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_draw_target(self.to_pb_target());
        let style = ProgressStyle::default_spinner().template(SPINNER_TEMPL);
        pb.set_style(style);
        pb.set_prefix(prefix);
        pb.enable_steady_tick(SPINNER_TICK_INTERVAL_MS);
        pb
    }

    fn to_pb_target(&self) -> ProgressDrawTarget {
        match &self.inner {
            Inner::Term(_) => ProgressDrawTarget::stderr(),
            _ => ProgressDrawTarget::hidden(),
        }
    }
}

impl Write for Console {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.as_mut_write().write(buf)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.as_mut_write().flush()
    }
}

macro_rules! def_color {
    ($name:ident, $name_upper:ident, $style:expr) => {
        ::lazy_static::lazy_static! {
            static ref $name_upper: ::console::Style = {
                use ::console::Style;
                $style
            };
        }

        pub fn $name<D>(val: D) -> ::console::StyledObject<D> {
            $name_upper.apply_to(val)
        }
    };
}

pub use color_defs::*;

#[cfg_attr(tarpaulin, ignore)]
mod color_defs {
    def_color!(sty_r, STY_R, Style::new().red());
    def_color!(sty_g, STY_G, Style::new().green());
    def_color!(sty_y, STY_Y, Style::new().yellow());
    def_color!(sty_dim, STY_DIM, Style::new().dim());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn() -> anyhow::Result<()> {
        let mut cnsl = Console::buf();
        cnsl.warn("message")?;
        let output_str = cnsl.take_output()?;
        assert!(output_str.ends_with("message\n"));
        assert!(output_str.contains("WARN:"));
        Ok(())
    }

    #[test]
    fn test_get_env_or_prompt_and_read() -> anyhow::Result<()> {
        let cnsl_buf_0 = Console::buf();
        let mut cnsl_buf_1 = Console::buf();
        cnsl_buf_1.write_input("test_input\n");
        let cnsl_sink_0 = Console::sink();
        let cnsl_sink_1 = Console::sink();
        let env_name_exists = if cfg!(windows) { "APPDATA" } else { "HOME" };
        let env_val: &str = &env::var(env_name_exists).unwrap();
        let tests = &mut [
            (cnsl_buf_0, env_name_exists, env_val),
            (cnsl_buf_1, "ACC_TEST_UNKNOWN_VAR", "test_input"),
            (cnsl_sink_0, env_name_exists, env_val),
            (cnsl_sink_1, "ACC_TEST_UNKNOWN_VAR", ""),
        ];

        for (ref mut cnsl, env_name, expected) in tests {
            let actual = cnsl.get_env_or_prompt_and_read(env_name, "prompt >", true)?;
            assert_eq!(&actual, expected);
        }
        Ok(())
    }

    #[test]
    fn test_password_is_masked() -> anyhow::Result<()> {
        let env_name_exists = if cfg!(windows) { "APPDATA" } else { "HOME" };
        let mut cnsl = Console::buf();
        cnsl.get_env_or_prompt_and_read(env_name_exists, "password: ", true)?;
        let output = cnsl.take_output()?;
        assert!(output.starts_with("password: ********"));
        Ok(())
    }
}
