use std::io::{self, Write as _};
use std::process::{Output, Stdio};
use std::time::Duration;

use acc_util::abs_path::AbsPathBuf;
use acc_util::model::Sample;
use anyhow::{anyhow, Context as _};
use tokio::io::AsyncWriteExt as _;
use tokio::process::Command;
use tokio::runtime;
use tokio::time::{timeout, Instant};

use crate::config::{CmdContext, Config};
use crate::{Console, Result};

mod status;

pub use status::{TestResult, TestStatus, TotalStatus};

/// Build output that is deleted when dropped, whichever way the run ends.
#[derive(Debug)]
struct TransientExecutable {
    path: AbsPathBuf,
}

impl TransientExecutable {
    fn new(path: AbsPathBuf) -> Self {
        Self { path }
    }
}

impl Drop for TransientExecutable {
    fn drop(&mut self) {
        // nothing to report to from drop
        let _ = self.path.remove_file();
    }
}

/// Compiles a source file once and runs it with each sample.
#[derive(Debug)]
pub struct Judge<'a> {
    conf: &'a Config,
}

impl<'a> Judge<'a> {
    pub fn new(conf: &'a Config) -> Self {
        Self { conf }
    }

    /// Returns one result per sample in sample order, or a single compile error result.
    pub fn run_local_tests(
        &self,
        source: &AbsPathBuf,
        samples: &[Sample],
        cnsl: &mut Console,
    ) -> Result<Vec<TestResult>> {
        let rt = runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Could not start async runtime")?;
        rt.block_on(self.run_all(source, samples, cnsl))
    }

    async fn run_all(
        &self,
        source: &AbsPathBuf,
        samples: &[Sample],
        cnsl: &mut Console,
    ) -> Result<Vec<TestResult>> {
        let lang = self.conf.language_for(source)?;
        let exe = source.strip_extension();
        let ctx = CmdContext::new(source, &exe);
        let run_cmd = lang.run_command(&ctx)?;
        let compile_cmd = lang.compile_command(&ctx)?;

        let _exe = match &compile_cmd {
            Some(compile_cmd) => {
                write!(cnsl, "Compiling {} ... ", source)?;
                let started_at = Instant::now();
                if let Err(message) = self.compile(compile_cmd).await {
                    writeln!(cnsl, "failed")?;
                    return Ok(vec![TestResult::compile_error(
                        message,
                        started_at.elapsed(),
                    )]);
                }
                writeln!(cnsl, "done")?;
                // armed only once the build wrote the file
                Some(TransientExecutable::new(exe.clone()))
            }
            None => None,
        };

        let mut results = Vec::with_capacity(samples.len());
        for sample in samples {
            let result = self.run_sample(&run_cmd, sample).await;
            writeln!(cnsl, "Sample {}", result)?;
            result.describe(cnsl)?;
            results.push(result);
        }
        Ok(results)
    }

    /// Returns the compiler's stderr or the reason it could not run on failure.
    async fn compile(&self, cmd: &[String]) -> std::result::Result<(), String> {
        let limit = self.conf.judge().compile_timeout();
        match timeout(limit, exec_child(cmd, None)).await {
            Err(_) => Err(format!("Compilation exceeded {}ms\n", limit.as_millis())),
            Ok(Err(err)) => Err(format!("{:#}\n", err)),
            Ok(Ok(output)) if output.status.success() => Ok(()),
            Ok(Ok(output)) => {
                let mut message = String::from_utf8_lossy(&output.stderr).into_owned();
                if message.is_empty() {
                    message = format!("Compiler exited with {}\n", output.status);
                }
                Err(message)
            }
        }
    }

    async fn run_sample(&self, cmd: &[String], sample: &Sample) -> TestResult {
        let limit = self.conf.judge().timeout();
        let started_at = Instant::now();
        let result = timeout(limit, exec_child(cmd, Some(sample.input().as_bytes()))).await;
        let elapsed = started_at.elapsed();

        match result {
            // the child is killed on drop of the timed out future
            Err(_) => TestResult::new(
                sample,
                TestStatus::Tle,
                String::new(),
                format!("Exceeded {}ms\n", limit.as_millis()),
                elapsed,
            ),
            Ok(Err(err)) => TestResult::new(
                sample,
                TestStatus::Re,
                String::new(),
                format!("{:#}\n", err),
                elapsed,
            ),
            Ok(Ok(output)) => {
                let actual = String::from_utf8_lossy(&output.stdout).into_owned();
                let mut message = String::from_utf8_lossy(&output.stderr).into_owned();
                let status = if !output.status.success() {
                    message.push_str(&format!("Process exited with {}\n", output.status));
                    TestStatus::Re
                } else if output.stdout == sample.output().as_bytes() {
                    TestStatus::Ok
                } else {
                    TestStatus::Wa
                };
                TestResult::new(sample, status, actual, message, elapsed)
            }
        }
    }
}

/// Runs `cmd` to completion, feeding `input` to its stdin while collecting its output.
async fn exec_child(cmd: &[String], input: Option<&[u8]>) -> Result<Output> {
    let (program, args) = cmd
        .split_first()
        .ok_or_else(|| anyhow!("Found empty command"))?;
    let mut child = Command::new(program)
        .args(args)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Could not start command : {}", program))?;

    let stdin = child.stdin.take();
    let write_input = async move {
        if let (Some(mut stdin), Some(input)) = (stdin, input) {
            match stdin.write_all(input).await {
                // the process does not need to read all of its input
                Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {}
                result => result?,
            }
        }
        Ok::<_, io::Error>(())
    };
    let (written, output) = tokio::join!(write_input, child.wait_with_output());
    let output = output.with_context(|| format!("Could not wait for command : {}", program))?;
    written.context("Could not write input to stdin")?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use acc_util::AccError;
    use tempfile::{tempdir, TempDir};

    use super::*;
    use crate::config::{JudgeConfig, LanguageConfig};

    /// A config whose "compiler" copies a shell script and whose runner is `sh`.
    fn sh_config(compile: Option<&[&str]>, timeout: Duration) -> Config {
        Config::new(
            Default::default(),
            Default::default(),
            JudgeConfig::new(timeout, Duration::from_secs(10)),
            vec![LanguageConfig::new(
                "sh",
                "0",
                compile,
                if compile.is_some() {
                    &["sh", "{{ exe }}"]
                } else {
                    &["sh", "{{ source }}"]
                },
            )],
        )
    }

    const COPY: &[&str] = &["cp", "{{ source }}", "{{ exe }}"];

    fn write_source(content: &str) -> anyhow::Result<(TempDir, AbsPathBuf)> {
        let test_dir = tempdir()?;
        let source = AbsPathBuf::try_new(test_dir.path())?.join("main.sh");
        fs::write(&source, content)?;
        Ok((test_dir, source))
    }

    fn statuses(results: &[TestResult]) -> Vec<TestStatus> {
        results.iter().map(TestResult::status).collect()
    }

    #[test]
    fn test_echo() -> anyhow::Result<()> {
        let conf = sh_config(Some(COPY), Duration::from_secs(2));
        let (_dir, source) = write_source("read x\necho \"$x\"\n")?;
        let samples = vec![Sample::new("1", "3\n", "3\n"), Sample::new("2", "4\n", "5\n")];

        let results = Judge::new(&conf).run_local_tests(&source, &samples, &mut Console::sink())?;
        assert_eq!(statuses(&results), vec![TestStatus::Ok, TestStatus::Wa]);
        assert_eq!(results[1].actual(), "4\n");
        assert_eq!(results[1].expected(), "5\n");
        assert!(!source.strip_extension().as_ref().exists());
        assert!(source.as_ref().exists());
        Ok(())
    }

    #[test]
    fn test_runtime_error_keeps_order() -> anyhow::Result<()> {
        let conf = sh_config(Some(COPY), Duration::from_secs(2));
        let (_dir, source) = write_source(
            "read x\nif [ \"$x\" = 2 ]; then echo broken >&2; exit 3; fi\necho \"$x\"\n",
        )?;
        let samples = vec![
            Sample::new("1", "1\n", "1\n"),
            Sample::new("2", "2\n", "2\n"),
            Sample::new("3", "3\n", "3\n"),
        ];

        let results = Judge::new(&conf).run_local_tests(&source, &samples, &mut Console::sink())?;
        assert_eq!(
            statuses(&results),
            vec![TestStatus::Ok, TestStatus::Re, TestStatus::Ok]
        );
        let names: Vec<_> = results.iter().map(|r| r.sample_name().as_str()).collect();
        assert_eq!(names, vec!["1", "2", "3"]);
        assert!(results[1].message().starts_with("broken\n"));
        assert!(!source.strip_extension().as_ref().exists());
        Ok(())
    }

    #[test]
    fn test_compile_error_keeps_existing_file() -> anyhow::Result<()> {
        let compile: &[&str] = &["sh", "-c", "exit 1"];
        let conf = sh_config(Some(compile), Duration::from_secs(2));
        let (_dir, source) = write_source("echo never\n")?;
        let existing = source.strip_extension();
        fs::write(&existing, "user data")?;
        let samples = vec![Sample::new("1", "", "never\n")];

        let results = Judge::new(&conf).run_local_tests(&source, &samples, &mut Console::sink())?;
        assert_eq!(statuses(&results), vec![TestStatus::Ce]);
        assert_eq!(fs::read_to_string(&existing)?, "user data");
        Ok(())
    }

    #[test]
    fn test_compile_error() -> anyhow::Result<()> {
        let compile: &[&str] = &["sh", "-c", "echo 'syntax error' >&2; exit 1"];
        let conf = sh_config(Some(compile), Duration::from_secs(2));
        let (_dir, source) = write_source("echo never\n")?;
        let samples = vec![Sample::new("1", "", "never\n"), Sample::new("2", "", "never\n")];

        let mut cnsl = Console::buf();
        let results = Judge::new(&conf).run_local_tests(&source, &samples, &mut cnsl)?;
        assert_eq!(statuses(&results), vec![TestStatus::Ce]);
        assert_eq!(results[0].message(), "syntax error\n");
        assert!(!source.strip_extension().as_ref().exists());
        let output = cnsl.take_output()?;
        assert!(output.contains("failed"));
        assert!(!output.contains("Sample"));
        Ok(())
    }

    #[test]
    fn test_compiler_not_found() -> anyhow::Result<()> {
        let compile: &[&str] = &["acc-no-such-compiler", "{{ source }}"];
        let conf = sh_config(Some(compile), Duration::from_secs(2));
        let (_dir, source) = write_source("echo 1\n")?;
        let samples = vec![Sample::new("1", "", "1\n")];

        let results = Judge::new(&conf).run_local_tests(&source, &samples, &mut Console::sink())?;
        assert_eq!(statuses(&results), vec![TestStatus::Ce]);
        assert!(results[0].message().contains("acc-no-such-compiler"));
        Ok(())
    }

    #[test]
    fn test_time_limit_exceeded() -> anyhow::Result<()> {
        let conf = sh_config(None, Duration::from_millis(300));
        let (_dir, source) = write_source("read x\nsleep 10\necho \"$x\"\n")?;
        let samples = vec![Sample::new("1", "1\n", "1\n")];

        let started_at = std::time::Instant::now();
        let results = Judge::new(&conf).run_local_tests(&source, &samples, &mut Console::sink())?;
        assert_eq!(statuses(&results), vec![TestStatus::Tle]);
        assert!(started_at.elapsed() < Duration::from_secs(5));
        Ok(())
    }

    #[test]
    fn test_without_compile_keeps_source() -> anyhow::Result<()> {
        let conf = sh_config(None, Duration::from_secs(2));
        let (_dir, source) = write_source("echo hello\n")?;
        let samples = vec![Sample::new("1", "ignored input\n", "hello\n")];

        let results = Judge::new(&conf).run_local_tests(&source, &samples, &mut Console::sink())?;
        assert_eq!(statuses(&results), vec![TestStatus::Ok]);
        assert!(source.as_ref().exists());
        Ok(())
    }

    #[test]
    fn test_unsupported_language() -> anyhow::Result<()> {
        let conf = sh_config(None, Duration::from_secs(2));
        let test_dir = tempdir()?;
        let source = AbsPathBuf::try_new(test_dir.path())?.join("main.kt");
        let err = Judge::new(&conf)
            .run_local_tests(&source, &[], &mut Console::sink())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AccError>(),
            Some(AccError::UnsupportedLanguage(ext)) if ext == "kt"
        ));
        Ok(())
    }

    #[test]
    #[ignore]
    fn test_go_echo() -> anyhow::Result<()> {
        let conf = Config::default();
        let test_dir = tempdir()?;
        let source = AbsPathBuf::try_new(test_dir.path())?.join("main.go");
        fs::write(
            &source,
            "package main\n\nimport \"fmt\"\n\nfunc main() {\n\tvar n int\n\tfmt.Scan(&n)\n\tfmt.Println(n)\n}\n",
        )?;
        let samples = vec![Sample::new("1", "3\n", "3\n"), Sample::new("2", "4\n", "5\n")];

        let results = Judge::new(&conf).run_local_tests(&source, &samples, &mut Console::sink())?;
        assert_eq!(statuses(&results), vec![TestStatus::Ok, TestStatus::Wa]);
        assert!(!source.strip_extension().as_ref().exists());
        Ok(())
    }
}
