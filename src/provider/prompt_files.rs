use crate::provider::{io_error, DecisionRequest, ProviderError};
use crate::shared::fs_atomic::atomic_write_file;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptArtifacts {
    pub prompt_file: PathBuf,
}

/// Persists the exact text sent to the decision source so a reply can be audited later.
pub fn write_prompt_artifacts(
    workspace: &Path,
    request: &DecisionRequest,
) -> Result<PromptArtifacts, ProviderError> {
    let prompt_dir = workspace.join("decision_prompts");
    fs::create_dir_all(&prompt_dir).map_err(|err| io_error(&prompt_dir, err))?;

    let prompt_file = prompt_dir.join(format!("{}_prompt.md", request.request_id));
    atomic_write_file(&prompt_file, request.combined_prompt().as_bytes())
        .map_err(|err| io_error(&prompt_file, err))?;

    Ok(PromptArtifacts { prompt_file })
}
