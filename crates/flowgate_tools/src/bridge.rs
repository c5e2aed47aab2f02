//! Tool-call execution bridge.

use crate::{ToolBridgeConfig, ToolCall, ToolCallStatus, ToolRegistry, ToolResult};
use flowgate_error::{ConfigError, ToolError, ToolErrorKind};
use futures::FutureExt;
use futures::future::join_all;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Called before a known tool starts running.
pub type BeforeHook = Arc<dyn Fn(&ToolCall) + Send + Sync>;

/// Called after a tool returned a value within the deadline.
pub type AfterHook = Arc<dyn Fn(&ToolCall, &ToolResult) + Send + Sync>;

/// Called once for every failed call: unknown tool, timeout or tool failure.
pub type ErrorHook = Arc<dyn Fn(&ToolCall, &ToolError) + Send + Sync>;

/// Runs tool calls through a [`ToolRegistry`] with a deadline and lifecycle hooks.
///
/// Every failure mode becomes a [`ToolResult`] with `success == false`; the
/// bridge never returns an error to its caller.
///
/// # Timeouts
///
/// The registry future is raced against the deadline with
/// [`tokio::time::timeout`]. When the deadline wins, the future is dropped,
/// which stops it at its next suspension point. Work the tool handed to other
/// tasks (for example with `tokio::spawn`) keeps running and its result is
/// discarded; tools that need hard cancellation must watch for it themselves.
///
/// # Hooks
///
/// Hooks are observers. A panicking hook is caught and logged, and the call
/// proceeds as if the hook had returned.
#[derive(Clone)]
pub struct ToolCallBridge {
    registry: Arc<dyn ToolRegistry>,
    timeout: Duration,
    before: Option<BeforeHook>,
    after: Option<AfterHook>,
    on_error: Option<ErrorHook>,
}

impl ToolCallBridge {
    /// Create a bridge over `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn new(
        registry: Arc<dyn ToolRegistry>,
        config: ToolBridgeConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(timeout_ms = config.timeout_ms, "Creating tool call bridge");
        Ok(Self {
            registry,
            timeout: config.timeout(),
            before: None,
            after: None,
            on_error: None,
        })
    }

    /// Set the hook run before each known tool starts.
    pub fn with_before_hook(mut self, hook: BeforeHook) -> Self {
        self.before = Some(hook);
        self
    }

    /// Set the hook run after each successful call.
    pub fn with_after_hook(mut self, hook: AfterHook) -> Self {
        self.after = Some(hook);
        self
    }

    /// Set the hook run for each failed call.
    pub fn with_error_hook(mut self, hook: ErrorHook) -> Self {
        self.on_error = Some(hook);
        self
    }

    /// Whether the registry knows `name`.
    pub fn has_tool(&self, name: &str) -> bool {
        self.registry.has(name)
    }

    /// Run one tool call.
    ///
    /// A tool that panics is reported like any other tool failure.
    #[instrument(skip(self, call), fields(tool = %call.name, call_id = %call.id))]
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        if !self.registry.has(&call.name) {
            let err = ToolError::new(ToolErrorKind::NotFound(call.name.clone()));
            warn!("Tool not found");
            return self.fail(call, ToolCallStatus::NotFound, err);
        }

        if let Some(hook) = &self.before {
            guarded("before", || hook(call));
        }

        debug!("Tool call running");
        let running =
            AssertUnwindSafe(self.registry.execute(&call.name, call.arguments.clone()))
                .catch_unwind();
        let outcome = tokio::time::timeout(self.timeout, running).await;

        match outcome {
            Ok(Ok(Ok(value))) => {
                debug!("Tool call succeeded");
                let result = ToolResult::success(call, value);
                if let Some(hook) = &self.after {
                    guarded("after", || hook(call, &result));
                }
                result
            }
            Ok(Ok(Err(err))) => {
                warn!(error = %err, "Tool call failed");
                self.fail(call, ToolCallStatus::Error, err)
            }
            Ok(Err(panic)) => {
                let message = panic_message(panic.as_ref());
                warn!(panic = %message, "Tool panicked");
                self.fail(
                    call,
                    ToolCallStatus::Error,
                    ToolError::execution(format!("tool panicked: {}", message)),
                )
            }
            Err(_) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                warn!(timeout_ms, "Tool call timed out");
                self.fail(
                    call,
                    ToolCallStatus::Timeout,
                    ToolError::new(ToolErrorKind::Timeout {
                        name: call.name.clone(),
                        timeout_ms,
                    }),
                )
            }
        }
    }

    /// Run every call concurrently and return results in input order.
    ///
    /// Calls are independent: a failure or timeout in one does not affect
    /// the others.
    #[instrument(skip_all, fields(calls = calls.len()))]
    pub async fn execute_all(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        let results = join_all(calls.iter().map(|call| self.execute(call))).await;
        debug!(
            succeeded = results.iter().filter(|result| result.success).count(),
            "Tool calls finished"
        );
        results
    }

    fn fail(&self, call: &ToolCall, status: ToolCallStatus, err: ToolError) -> ToolResult {
        if let Some(hook) = &self.on_error {
            guarded("error", || hook(call, &err));
        }
        ToolResult::failure(call, status, err.kind().to_string())
    }
}

fn guarded(hook: &'static str, f: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(f)).is_err() {
        warn!(hook, "Tool hook panicked");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
