//! Collaborator adapters for the pizza dialogue engine.
//!
//! - `llm`: chat-completions client for OpenAI-compatible servers
//! - `intent`: few-shot intent classification on top of [`llm::LlmClient`]
//! - `entities`: delivery address extraction on top of [`llm::LlmClient`]
//! - `pizza_api`: HTTP client for menu, address validation and orders
//! - `runtime`: builds a [`pizzabot_core::DialogueEngine`] from configuration
//!
//! The language model only classifies and extracts. Menu matching, address
//! acceptance and order placement stay with the core and the pizza API.

pub mod entities;
pub mod intent;
pub mod llm;
pub mod pizza_api;
pub mod runtime;

pub use runtime::AgentRuntime;
