use crate::provider::invocation::build_invocation;
use crate::provider::{
    io_error, parse_anthropic_output, parse_openai_jsonl, write_prompt_artifacts,
    DecisionRequest, DecisionSource, InvocationLog, ProviderError, ProviderKind, ProviderRequest,
    ProviderResult,
};
use crate::shared::EventLog;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct RunnerBinaries {
    pub anthropic: String,
    pub openai: String,
}

impl Default for RunnerBinaries {
    fn default() -> Self {
        Self {
            anthropic: "claude".to_string(),
            openai: "codex".to_string(),
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        let _ = BufReader::new(pipe).read_to_string(&mut buf);
        buf
    })
}

enum Finished {
    Exited(ExitStatus),
    /// Killed after the deadline; carries the status reaped after the kill.
    Killed(ExitStatus),
}

fn wait_with_deadline(child: &mut Child, timeout: Duration) -> std::io::Result<Finished> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Finished::Exited(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            return child.wait().map(Finished::Killed);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

pub fn run_provider(
    request: &ProviderRequest,
    binaries: &RunnerBinaries,
) -> Result<ProviderResult, ProviderError> {
    let spec = build_invocation(request, binaries)?;
    let mut log = InvocationLog {
        request_id: request.request_id.clone(),
        provider: request.provider,
        model: spec.resolved_model.clone(),
        binary: spec.binary.clone(),
        working_directory: request.cwd.clone(),
        prompt_file: request.prompt_artifacts.prompt_file.clone(),
        exit_code: None,
        timed_out: false,
    };

    let spawned = Command::new(&spec.binary)
        .current_dir(&request.cwd)
        .args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();
    let mut child = match spawned {
        Ok(child) => child,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ProviderError::MissingBinary {
                provider: request.provider,
                binary: spec.binary,
                log: Box::new(log),
            });
        }
        Err(err) => return Err(io_error(&request.cwd, err)),
    };

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        let _ = child.kill();
        return Err(io_error(
            &request.cwd,
            std::io::Error::other("provider process has no output pipes"),
        ));
    };
    let stdout = spawn_reader(stdout);
    let stderr = spawn_reader(stderr);

    let finished =
        wait_with_deadline(&mut child, request.timeout).map_err(|e| io_error(&request.cwd, e))?;
    let stdout = stdout.join().unwrap_or_default();
    let stderr = stderr.join().unwrap_or_default();

    let status = match finished {
        Finished::Exited(status) => status,
        Finished::Killed(status) => {
            log.timed_out = true;
            log.exit_code = status.code();
            return Err(ProviderError::Timeout {
                provider: request.provider,
                timeout_ms: request.timeout.as_millis() as u64,
                log: Box::new(log),
            });
        }
    };
    log.exit_code = status.code();
    if !status.success() {
        return Err(ProviderError::NonZeroExit {
            provider: request.provider,
            exit_code: status.code().unwrap_or(-1),
            stderr,
            log: Box::new(log),
        });
    }

    let parsed = match request.provider {
        ProviderKind::Anthropic => parse_anthropic_output(&stdout),
        ProviderKind::OpenAi => parse_openai_jsonl(&stdout),
    };
    match parsed {
        Ok(message) => Ok(ProviderResult { message, log }),
        Err(ProviderError::ParseFailure {
            provider, reason, ..
        }) => Err(ProviderError::ParseFailure {
            provider,
            reason,
            log: Some(Box::new(log)),
        }),
        Err(other) => Err(other),
    }
}

/// Decision source backed by a local LLM CLI (`claude` or `codex`).
pub struct CliDecisionSource {
    pub provider: ProviderKind,
    pub model: String,
    pub workspace: PathBuf,
    pub timeout: Duration,
    pub binaries: RunnerBinaries,
    pub log: Arc<EventLog>,
}

impl DecisionSource for CliDecisionSource {
    fn decide(&self, request: &DecisionRequest) -> Result<String, ProviderError> {
        let artifacts = write_prompt_artifacts(&self.workspace, request)?;
        let provider_request = ProviderRequest {
            request_id: request.request_id.clone(),
            provider: self.provider,
            model: self.model.clone(),
            cwd: self.workspace.clone(),
            message: request.combined_prompt(),
            prompt_artifacts: artifacts,
            timeout: self.timeout,
        };

        match run_provider(&provider_request, &self.binaries) {
            Ok(result) => {
                self.log.info(
                    "decision.reply",
                    &format!(
                        "request={} provider={} model={} exit_code={:?}",
                        result.log.request_id,
                        result.log.provider,
                        result.log.model,
                        result.log.exit_code
                    ),
                );
                Ok(result.message)
            }
            Err(err) => {
                self.log.error(
                    "decision.failed",
                    &format!("request={} error={err}", request.request_id),
                );
                Err(err)
            }
        }
    }
}
