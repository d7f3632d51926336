use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod invocation;
pub mod output_parse;
pub mod prompt_files;
pub mod runner;

pub use invocation::{build_invocation, resolve_model};
pub use output_parse::{parse_anthropic_output, parse_openai_jsonl};
pub use prompt_files::{write_prompt_artifacts, PromptArtifacts};
pub use runner::{run_provider, CliDecisionSource, RunnerBinaries};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("unknown provider `{0}`")]
    UnknownProvider(String),
    #[error("unsupported model `{model}` for {provider}")]
    UnsupportedModel {
        provider: ProviderKind,
        model: String,
    },
    #[error("provider binary missing for {provider}: {binary}")]
    MissingBinary {
        provider: ProviderKind,
        binary: String,
        log: Box<InvocationLog>,
    },
    #[error("provider process failed for {provider} with exit code {exit_code}: {stderr}")]
    NonZeroExit {
        provider: ProviderKind,
        exit_code: i32,
        stderr: String,
        log: Box<InvocationLog>,
    },
    #[error("provider process timed out for {provider} after {timeout_ms}ms")]
    Timeout {
        provider: ProviderKind,
        timeout_ms: u64,
        log: Box<InvocationLog>,
    },
    #[error("provider output parse failure for {provider}: {reason}")]
    ParseFailure {
        provider: ProviderKind,
        reason: String,
        log: Option<Box<InvocationLog>>,
    },
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Anthropic,
    #[serde(rename = "openai")]
    OpenAi,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Anthropic => write!(f, "anthropic"),
            ProviderKind::OpenAi => write!(f, "openai"),
        }
    }
}

impl TryFrom<&str> for ProviderKind {
    type Error = ProviderError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            other => Err(ProviderError::UnknownProvider(other.to_string())),
        }
    }
}

/// One call to the decision source: a system prompt plus the text the caller sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionRequest {
    pub request_id: String,
    pub system_prompt: String,
    pub user_message: String,
}

impl DecisionRequest {
    /// The single text blob handed to a provider that has no separate system channel.
    pub fn combined_prompt(&self) -> String {
        if self.user_message.trim().is_empty() {
            return self.system_prompt.clone();
        }
        format!(
            "{}\n\nUSER REQUEST:\n{}",
            self.system_prompt.trim_end(),
            self.user_message.trim()
        )
    }
}

/// Opaque reasoner: prompt text in, reply text out.
pub trait DecisionSource: Send + Sync {
    fn decide(&self, request: &DecisionRequest) -> Result<String, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub request_id: String,
    pub provider: ProviderKind,
    pub model: String,
    pub cwd: PathBuf,
    pub message: String,
    pub prompt_artifacts: PromptArtifacts,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct InvocationSpec {
    pub binary: String,
    pub args: Vec<String>,
    pub resolved_model: String,
}

#[derive(Debug, Clone)]
pub struct InvocationLog {
    pub request_id: String,
    pub provider: ProviderKind,
    pub model: String,
    pub binary: String,
    pub working_directory: PathBuf,
    pub prompt_file: PathBuf,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
}

#[derive(Debug, Clone)]
pub struct ProviderResult {
    pub message: String,
    pub log: InvocationLog,
}

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> ProviderError {
    ProviderError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_parses_case_insensitively() {
        assert_eq!(
            ProviderKind::try_from(" OpenAI ").expect("openai"),
            ProviderKind::OpenAi
        );
        assert_eq!(
            ProviderKind::try_from("anthropic").expect("anthropic"),
            ProviderKind::Anthropic
        );
        assert!(matches!(
            ProviderKind::try_from("mistral"),
            Err(ProviderError::UnknownProvider(name)) if name == "mistral"
        ));
    }

    #[test]
    fn combined_prompt_appends_user_request() {
        let request = DecisionRequest {
            request_id: "q-1".to_string(),
            system_prompt: "SYSTEM\n".to_string(),
            user_message: "  warm my seat ".to_string(),
        };
        assert_eq!(request.combined_prompt(), "SYSTEM\n\nUSER REQUEST:\nwarm my seat");

        let empty = DecisionRequest {
            user_message: String::new(),
            ..request
        };
        assert_eq!(empty.combined_prompt(), "SYSTEM\n");
    }
}
