//! Document compiler adapter.
//!
//! The markup is compiled by external tools in an exclusive scratch
//! directory: `platex` turns `<job>.tex` into `<job>.dvi`, then `dvipdfmx`
//! turns that into `<job>.pdf`. Both stages share one deadline. The scratch
//! directory is removed when the compile returns, whatever the outcome.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::process::Command;
use tokio::time::Instant;

use crate::config::CompilerSettings;
use crate::error::{ProgramError, ProgramResult};

/// Longest diagnostic excerpt carried in a compilation error.
const DIAGNOSTIC_TAIL_BYTES: usize = 2000;

/// Turns markup into compiled PDF bytes.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; independent compilations may run
/// concurrently and must not share scratch state.
#[async_trait]
pub trait DocumentCompiler: Send + Sync {
    async fn compile(&self, markup: &str) -> ProgramResult<Vec<u8>>;
}

/// `platex` + `dvipdfmx` toolchain.
#[derive(Debug, Clone)]
pub struct PlatexCompiler {
    settings: CompilerSettings,
}

impl PlatexCompiler {
    pub fn new(settings: CompilerSettings) -> Self {
        Self { settings }
    }

    async fn run_stage(
        &self,
        stage: &str,
        mut command: Command,
        workdir: &Path,
        deadline: Instant,
    ) -> ProgramResult<()> {
        command
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command
            .spawn()
            .map_err(|e| ProgramError::CompilationFailure {
                stage: stage.to_string(),
                diagnostics: format!("failed to launch: {}", e),
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let wait = tokio::time::timeout_at(deadline, child.wait_with_output());
        let output = match wait.await {
            Ok(result) => result?,
            Err(_) => {
                warn!("Compiler stage '{}' exceeded its time budget", stage);
                return Err(ProgramError::CompilationTimeout {
                    stage: stage.to_string(),
                    timeout: self.settings.timeout(),
                });
            }
        };

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            warn!("Compiler stage '{}' failed with {}", stage, output.status);
            return Err(ProgramError::CompilationFailure {
                stage: stage.to_string(),
                diagnostics: format!("{}: {}", output.status, diagnostic_tail(&combined)),
            });
        }

        debug!("Compiler stage '{}' finished", stage);
        Ok(())
    }
}

#[async_trait]
impl DocumentCompiler for PlatexCompiler {
    async fn compile(&self, markup: &str) -> ProgramResult<Vec<u8>> {
        let settings = &self.settings;
        let deadline = Instant::now() + settings.timeout();

        let workdir = tempfile::Builder::new()
            .prefix("program-compile-")
            .tempdir()?;
        let tex_name = format!("{}.tex", settings.job_name);
        let dvi_name = format!("{}.dvi", settings.job_name);
        let pdf_path = workdir.path().join(format!("{}.pdf", settings.job_name));

        tokio::fs::write(workdir.path().join(&tex_name), markup).await?;

        let mut engine = Command::new(&settings.engine);
        engine.args(&settings.engine_args).arg(&tex_name);
        self.run_stage(&settings.engine, engine, workdir.path(), deadline)
            .await?;

        let mut converter = Command::new(&settings.converter);
        converter.args(&settings.converter_args).arg(&dvi_name);
        self.run_stage(&settings.converter, converter, workdir.path(), deadline)
            .await?;

        let bytes = match tokio::fs::read(&pdf_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        if bytes.is_empty() {
            return Err(ProgramError::CompilationFailure {
                stage: settings.converter.clone(),
                diagnostics: format!("no output produced at {}", pdf_path.display()),
            });
        }

        info!("Compiled program markup into {} bytes", bytes.len());
        Ok(bytes)
    }
}

/// Last `DIAGNOSTIC_TAIL_BYTES` of `text`, cut on a character boundary.
fn diagnostic_tail(text: &str) -> &str {
    let text = text.trim_end();
    if text.len() <= DIAGNOSTIC_TAIL_BYTES {
        return text;
    }
    let mut start = text.len() - DIAGNOSTIC_TAIL_BYTES;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}
