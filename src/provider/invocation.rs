use crate::provider::{InvocationSpec, ProviderError, ProviderKind, ProviderRequest, RunnerBinaries};

const ANTHROPIC_MODEL_ALIASES: &[(&str, &str)] = &[
    ("sonnet", "claude-sonnet-4-5"),
    ("opus", "claude-opus-4-6"),
    ("haiku", "claude-haiku-4-5"),
];

pub fn resolve_model(provider: ProviderKind, model: &str) -> Result<String, ProviderError> {
    let trimmed = model.trim();
    if trimmed.is_empty() {
        return Err(ProviderError::UnsupportedModel {
            provider,
            model: model.to_string(),
        });
    }
    match provider {
        ProviderKind::Anthropic => {
            if let Some((_, full)) = ANTHROPIC_MODEL_ALIASES
                .iter()
                .find(|(alias, _)| *alias == trimmed)
            {
                return Ok((*full).to_string());
            }
            if trimmed.starts_with("claude-") {
                return Ok(trimmed.to_string());
            }
            Err(ProviderError::UnsupportedModel {
                provider,
                model: trimmed.to_string(),
            })
        }
        ProviderKind::OpenAi => Ok(trimmed.to_string()),
    }
}

/// Every decision call is a fresh, non-interactive session: the live state is
/// re-rendered into each prompt, so no provider-side conversation is resumed.
pub fn build_invocation(
    request: &ProviderRequest,
    binaries: &RunnerBinaries,
) -> Result<InvocationSpec, ProviderError> {
    let model = resolve_model(request.provider, &request.model)?;
    match request.provider {
        ProviderKind::Anthropic => Ok(InvocationSpec {
            binary: binaries.anthropic.clone(),
            args: vec![
                "--model".to_string(),
                model.clone(),
                "-p".to_string(),
                request.message.clone(),
            ],
            resolved_model: model,
        }),
        ProviderKind::OpenAi => Ok(InvocationSpec {
            binary: binaries.openai.clone(),
            args: vec![
                "exec".to_string(),
                "--model".to_string(),
                model.clone(),
                "--skip-git-repo-check".to_string(),
                "--json".to_string(),
                request.message.clone(),
            ],
            resolved_model: model,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::PromptArtifacts;
    use std::path::PathBuf;
    use std::time::Duration;

    fn request(provider: ProviderKind, model: &str) -> ProviderRequest {
        ProviderRequest {
            request_id: "q-1".to_string(),
            provider,
            model: model.to_string(),
            cwd: PathBuf::from("/tmp"),
            message: "prompt text".to_string(),
            prompt_artifacts: PromptArtifacts {
                prompt_file: PathBuf::from("/tmp/q-1_prompt.md"),
            },
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn anthropic_aliases_map_to_full_names() {
        assert_eq!(
            resolve_model(ProviderKind::Anthropic, "sonnet").expect("alias"),
            "claude-sonnet-4-5"
        );
        assert_eq!(
            resolve_model(ProviderKind::Anthropic, "claude-opus-4-6").expect("full"),
            "claude-opus-4-6"
        );
        assert!(resolve_model(ProviderKind::Anthropic, "gpt-4o").is_err());
        assert!(resolve_model(ProviderKind::OpenAi, "  ").is_err());
    }

    #[test]
    fn anthropic_invocation_is_single_shot() {
        let spec = build_invocation(&request(ProviderKind::Anthropic, "haiku"), &RunnerBinaries::default())
            .expect("build");
        assert_eq!(spec.binary, "claude");
        assert_eq!(spec.resolved_model, "claude-haiku-4-5");
        assert!(!spec.args.contains(&"-c".to_string()));
        assert_eq!(spec.args.last().map(String::as_str), Some("prompt text"));
    }

    #[test]
    fn openai_invocation_requests_jsonl_without_resume() {
        let spec = build_invocation(&request(ProviderKind::OpenAi, "gpt-4o"), &RunnerBinaries::default())
            .expect("build");
        assert_eq!(spec.binary, "codex");
        assert_eq!(spec.args[0], "exec");
        assert!(spec.args.contains(&"--json".to_string()));
        assert!(!spec.args.contains(&"resume".to_string()));
    }
}
