//! # NexusOne Core
//!
//! This crate implements the policy-document ingestion pipeline and the
//! chat-context assembly for the NexusOne onboarding service. Uploaded policy
//! files are stored as fixed-size chunks in SQLite, validated for
//! completeness, reassembled on demand, and turned into bounded plain-text
//! excerpts that ground an external chat model's answers.

pub mod blob;
pub mod chat;
pub mod constants;
pub mod errors;
pub mod ingest;
pub mod onboarding;
pub mod prompts;
pub mod providers;
pub mod relevance;

pub use errors::NexusError;
