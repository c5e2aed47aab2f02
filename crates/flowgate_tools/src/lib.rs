//! Tool-call execution for model-driven workflows.
//!
//! A [`ToolCallBridge`] runs [`ToolCall`]s against a [`ToolRegistry`],
//! bounding each call with a deadline, notifying lifecycle hooks, and turning
//! every outcome into a [`ToolResult`]. Calls can be fanned out with
//! [`ToolCallBridge::execute_all`], which preserves input order.
//!
//! ```rust,ignore
//! let mut registry = InMemoryToolRegistry::new();
//! registry.register(Arc::new(SearchTool::new()));
//!
//! let bridge = ToolCallBridge::new(Arc::new(registry), ToolBridgeConfig::default())?;
//! let results = bridge.execute_all(&calls).await;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bridge;
mod config;
mod registry;
mod types;

pub use bridge::{AfterHook, BeforeHook, ErrorHook, ToolCallBridge};
pub use config::ToolBridgeConfig;
pub use registry::{InMemoryToolRegistry, Tool, ToolRegistry};
pub use types::{ToolCall, ToolCallStatus, ToolResult};
