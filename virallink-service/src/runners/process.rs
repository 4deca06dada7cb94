// Process Runner
// Spawns an interpreter for one script and captures its combined output

use crate::error::{PipelineError, PipelineResult};
use crate::resolve::ResolvedCommand;
use crate::runners::log::ExecutionLog;
use crate::runners::{detect_failure, OutputCallback, StepResult, StepRunner, StepStatus};

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

/// Runs scripts as child processes, one at a time
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    working_dir: PathBuf,
}

impl ProcessRunner {
    /// Create a runner launching processes from `working_dir`
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }
}

#[async_trait::async_trait]
impl StepRunner for ProcessRunner {
    async fn run(
        &self,
        command: &ResolvedCommand,
        log: &ExecutionLog,
        on_output: Option<&OutputCallback>,
    ) -> PipelineResult<StepResult> {
        let start = Instant::now();

        // Nothing is launched unless its output has somewhere to go
        let mut log_file = log.open_append().await?;
        log_file
            .write_all(format!("### {}\n", command).as_bytes())
            .await?;

        let mut cmd = Command::new(&command.program);
        cmd.arg(&command.script_path);
        cmd.args(&command.args);
        cmd.current_dir(&self.working_dir);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|source| PipelineError::ScriptLaunchFailure {
                script: command.script.clone(),
                source,
            })?;

        let stdout = child.stdout.take().expect("stdout was piped");
        let stderr = child.stderr.take().expect("stderr was piped");

        // Both streams feed one channel so the log keeps arrival order
        let (tx, mut rx) = mpsc::unbounded_channel();
        let stdout_handle = tokio::spawn(forward_lines(stdout, false, tx.clone()));
        let stderr_handle = tokio::spawn(forward_lines(stderr, true, tx));

        let mut stdout_text = String::new();
        let mut stderr_text = String::new();

        let captured: std::io::Result<()> = async {
            while let Some((line, is_error)) = rx.recv().await {
                if let Some(callback) = on_output {
                    callback(&line, is_error);
                }

                log_file.write_all(line.as_bytes()).await?;
                log_file.write_all(b"\n").await?;

                let buffer = if is_error {
                    &mut stderr_text
                } else {
                    &mut stdout_text
                };
                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(&line);
            }
            log_file.flush().await
        }
        .await;

        if let Err(e) = captured {
            tracing::error!(script = %command.script, error = %e, "execution log write failed; stopping script");
            let _ = child.kill().await;
            return Err(e.into());
        }

        let _ = stdout_handle.await;
        let _ = stderr_handle.await;

        let exit_code = child.wait().await?.code();
        let status = detect_failure(&stdout_text, &stderr_text);

        if status == StepStatus::Succeeded && exit_code != Some(0) {
            tracing::warn!(
                script = %command.script,
                exit_code = ?exit_code,
                "script exited unsuccessfully without the failure marker; treating as completed"
            );
        }

        Ok(StepResult {
            script: command.script.clone(),
            status,
            stdout: stdout_text,
            stderr: stderr_text,
            exit_code,
            duration: start.elapsed(),
        })
    }
}

/// Read lines from a child stream until EOF, tolerating invalid UTF-8
async fn forward_lines<R>(stream: R, is_error: bool, tx: mpsc::UnboundedSender<(String, bool)>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']).to_string();
                if tx.send((line, is_error)).is_err() {
                    break;
                }
            }
        }
    }
}
