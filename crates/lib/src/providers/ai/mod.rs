pub mod gemini;
pub mod local;

use crate::errors::NexusError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with an external chat-completion provider.
///
/// This defines the single seam between the context assembly logic and the
/// hosted model that actually answers the employee's question (e.g. Gemini
/// or an OpenAI-compatible local endpoint).
#[async_trait]
pub trait ChatProvider: Send + Sync + Debug + DynClone {
    /// Generates a response from a given system and user prompt.
    async fn generate(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, NexusError>;
}

dyn_clone::clone_trait_object!(ChatProvider);
