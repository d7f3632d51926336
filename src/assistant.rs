use crate::catalog::{CapabilityCatalog, SharedCatalog};
use crate::command::report_for_invocation;
use crate::config::{ConfigError, Settings};
use crate::decision::{interpret, DecisionEnvelope, DecisionError, ToolInvocation};
use crate::dispatch::Dispatcher;
use crate::prompts::{
    fallback_final_response, prompt_digest, render_final_response_prompt, render_system_prompt,
};
use crate::provider::{
    CliDecisionSource, DecisionRequest, DecisionSource, ProviderError, ProviderKind,
    RunnerBinaries,
};
use crate::shared::ids::generate_query_id;
use crate::shared::logging::now_secs;
use crate::shared::EventLog;
use crate::telemetry::{FileTelemetrySource, LiveStateSnapshot, SystemClock, TelemetryCache};
use crate::transport::{BackendTransport, HttpTransport};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub const DECISION_WORKSPACE_DIR: &str = "workspace";

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("No query provided")]
    EmptyQuery,
    #[error("Failed to process query: {0}")]
    DecisionSource(#[source] ProviderError),
    #[error("Invalid action from LLM: {0}")]
    InvalidDecision(#[from] DecisionError),
    #[error("Tool execution failed: {body}")]
    ToolFailed { status_code: u16, body: Value },
}

impl AssistantError {
    pub fn status_code(&self) -> u16 {
        match self {
            AssistantError::EmptyQuery | AssistantError::InvalidDecision(_) => 400,
            AssistantError::DecisionSource(_) => 500,
            AssistantError::ToolFailed { status_code, .. } => *status_code,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    Success,
    Error,
}

/// Answer to one inbound query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    pub status: QueryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub metadata: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<Value>,
    /// `{"seatCommand": ...}` when the invocation carried a seat command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Value>,
    pub query_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_digest: Option<String>,
    #[serde(skip)]
    pub status_code: u16,
}

impl QueryResponse {
    fn answered(query_id: String, metadata: String, response: String) -> Self {
        Self {
            status: QueryStatus::Success,
            response: Some(response),
            error: None,
            metadata,
            tool_used: None,
            tool_result: None,
            command: None,
            query_id,
            prompt_digest: None,
            status_code: 200,
        }
    }

    fn failed(query_id: String, metadata: String, err: &AssistantError) -> Self {
        Self {
            status: QueryStatus::Error,
            response: None,
            error: Some(err.to_string()),
            metadata,
            tool_used: None,
            tool_result: None,
            command: None,
            query_id,
            prompt_digest: None,
            status_code: err.status_code(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| json!({ "status": "error" }))
    }
}

/// The query pipeline: state and capabilities in, one decision, at most one
/// invocation, a normalized command out. Shared across worker threads behind an `Arc`.
pub struct Assistant {
    catalog: Arc<SharedCatalog>,
    telemetry: Arc<TelemetryCache>,
    dispatcher: Dispatcher,
    decider: Box<dyn DecisionSource>,
    log: Arc<EventLog>,
    compose_final_response: bool,
}

impl Assistant {
    pub fn new(
        catalog: Arc<SharedCatalog>,
        telemetry: Arc<TelemetryCache>,
        dispatcher: Dispatcher,
        decider: Box<dyn DecisionSource>,
        log: Arc<EventLog>,
    ) -> Self {
        Self {
            catalog,
            telemetry,
            dispatcher,
            decider,
            log,
            compose_final_response: true,
        }
    }

    /// Skip the follow-up call that phrases tool results; replies use the fixed
    /// "Action completed" text instead.
    pub fn without_final_response(mut self) -> Self {
        self.compose_final_response = false;
        self
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let state_root = settings.resolve_state_root()?;
        let log = Arc::new(EventLog::under_state_root(&state_root));
        let transport: Arc<dyn BackendTransport> =
            Arc::new(HttpTransport::from_settings(&settings.transport));
        let catalog = Arc::new(SharedCatalog::new(
            settings.backends.clone(),
            Arc::clone(&transport),
            Arc::clone(&log),
            settings.catalog_max_age(),
        ));
        let telemetry = Arc::new(TelemetryCache::new(
            Arc::new(FileTelemetrySource::new(&settings.telemetry.path)),
            Arc::new(SystemClock),
            settings.freshness_deadline(),
            Arc::clone(&log),
        ));

        let mut binaries = RunnerBinaries::default();
        if let Some(binary) = settings.decision.binary.clone() {
            match settings.decision.provider {
                ProviderKind::Anthropic => binaries.anthropic = binary,
                ProviderKind::OpenAi => binaries.openai = binary,
            }
        }
        let decider = CliDecisionSource {
            provider: settings.decision.provider,
            model: settings.decision.model.clone(),
            workspace: state_root.join(DECISION_WORKSPACE_DIR),
            timeout: Duration::from_secs(settings.decision.timeout_seconds),
            binaries,
            log: Arc::clone(&log),
        };

        Ok(Self::new(
            catalog,
            telemetry,
            Dispatcher::new(transport, Arc::clone(&log)),
            Box::new(decider),
            log,
        ))
    }

    pub fn process_query(&self, query: &str) -> QueryResponse {
        let query_id = generate_query_id(now_secs());
        let query = query.trim();
        let snapshot = self.telemetry.get();
        let metadata = snapshot.formatted();

        if query.is_empty() {
            return QueryResponse::failed(query_id, metadata, &AssistantError::EmptyQuery);
        }

        let catalog = self.catalog.current();
        let system_prompt = render_system_prompt(&metadata, &catalog);
        let digest = prompt_digest(&system_prompt);
        self.log.info(
            "query.received",
            &format!(
                "query_id={query_id} prompt_digest={digest} tools={}",
                catalog.tool_count()
            ),
        );

        let request = DecisionRequest {
            request_id: query_id.clone(),
            system_prompt,
            user_message: query.to_string(),
        };
        let outcome = self
            .decider
            .decide(&request)
            .map_err(AssistantError::DecisionSource)
            .and_then(|reply| interpret(&reply).map_err(AssistantError::from));

        let mut response = match outcome {
            Err(err) => {
                self.log.warn(
                    "query.failed",
                    &format!("query_id={query_id} error={err}"),
                );
                QueryResponse::failed(query_id, metadata, &err)
            }
            Ok(DecisionEnvelope::DirectAnswer { text }) => {
                self.log
                    .info("query.answered", &format!("query_id={query_id} kind=direct"));
                QueryResponse::answered(query_id, metadata, text)
            }
            Ok(DecisionEnvelope::ToolInvocation(invocation)) => {
                self.run_invocation(query, query_id, metadata, &catalog, &snapshot, invocation)
            }
        };
        response.prompt_digest = Some(digest);
        response
    }

    fn run_invocation(
        &self,
        query: &str,
        query_id: String,
        metadata: String,
        catalog: &CapabilityCatalog,
        snapshot: &LiveStateSnapshot,
        invocation: ToolInvocation,
    ) -> QueryResponse {
        let outcome = self
            .dispatcher
            .invoke(catalog, &invocation.capability, &invocation.args);

        if let (Some(hint), Some(backend)) = (&invocation.backend_hint, &outcome.backend) {
            if hint != backend.as_str() {
                self.log.warn(
                    "dispatch.hint_mismatch",
                    &format!(
                        "query_id={query_id} capability={} hinted={hint} owner={backend}",
                        invocation.capability
                    ),
                );
            }
        }

        if !outcome.is_success() {
            let err = AssistantError::ToolFailed {
                status_code: outcome.status_code,
                body: outcome.body,
            };
            self.log
                .warn("query.failed", &format!("query_id={query_id} error={err}"));
            return QueryResponse::failed(query_id, metadata, &err);
        }

        let report = report_for_invocation(
            &invocation.capability,
            &invocation.args,
            &outcome.body,
            snapshot,
        );
        if let Some(report) = &report {
            for fallback in &report.fallbacks {
                self.log.warn(
                    "command.normalization_fallback",
                    &format!("query_id={query_id} {fallback}"),
                );
            }
        }

        let reasoning = invocation.rationale.clone().unwrap_or_default();
        let text = self.final_response(&query_id, query, &reasoning, &outcome.body);
        let tool_used = match &outcome.backend {
            Some(backend) => format!("{backend}.{}", invocation.capability),
            None => invocation.capability.clone(),
        };
        self.log.info(
            "query.answered",
            &format!("query_id={query_id} kind=tool tool={tool_used}"),
        );

        let mut response = QueryResponse::answered(query_id, metadata, text);
        response.tool_used = Some(tool_used);
        response.tool_result = Some(outcome.body);
        response.command = report.map(|report| report.command.to_wire());
        response
    }

    fn final_response(&self, query_id: &str, query: &str, reasoning: &str, result: &Value) -> String {
        if !self.compose_final_response {
            return fallback_final_response(result);
        }
        let request = DecisionRequest {
            request_id: format!("{query_id}-final"),
            system_prompt: render_final_response_prompt(query, reasoning, result),
            user_message: String::new(),
        };
        match self.decider.decide(&request) {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => fallback_final_response(result),
            Err(err) => {
                self.log.warn(
                    "query.final_response_failed",
                    &format!("query_id={query_id} error={err}"),
                );
                fallback_final_response(result)
            }
        }
    }

    /// Current capability listing, discovering first if needed.
    pub fn tools(&self) -> Value {
        self.catalog.current().to_wire()
    }

    pub fn metadata(&self) -> Value {
        let snapshot = self.telemetry.get();
        json!({
            "formatted": snapshot.formatted(),
            "raw": snapshot.raw(),
            "captured_at": snapshot.captured_at().map(|at| at.to_rfc3339()),
        })
    }

    /// Forces rediscovery and a telemetry reload. Telemetry failure is reported, not fatal.
    pub fn refresh(&self) -> Value {
        let catalog = self.catalog.refresh();
        let telemetry = match self.telemetry.refresh() {
            Ok(_) => json!({ "status": "success" }),
            Err(err) => json!({ "status": "stale", "error": err.to_string() }),
        };
        json!({
            "status": "success",
            "message": "Tools refreshed",
            "tools_count": catalog.tool_count(),
            "generation": self.catalog.generation(),
            "issues": catalog.issues().iter().map(ToString::to_string).collect::<Vec<_>>(),
            "telemetry": telemetry,
        })
    }
}
