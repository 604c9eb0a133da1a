pub mod client;
pub mod events;
pub mod mock;
pub mod runtime;
pub mod tools;

pub use client::LLMClient;
pub use runtime::{AgentDefinition, AgentRuntime, ModelTier, ToolKind};
