pub mod openai;

use crate::errors::InsightError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with an AI provider.
///
/// It exposes the two historical wire shapes of the provider: a richer
/// structured-response shape and an older conversational shape. Either
/// may reject the forced-JSON response mode depending on the endpoint
/// version, which callers must be prepared to handle as a capability
/// mismatch rather than an outage.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Calls the richest available shape with a forced-JSON response
    /// mode and returns the raw text output.
    async fn generate_structured(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, InsightError>;

    /// Calls the conversational completion shape, optionally requesting
    /// the forced-JSON response mode, and returns the raw text output.
    async fn generate_chat(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        json_mode: bool,
    ) -> Result<String, InsightError>;
}

dyn_clone::clone_trait_object!(AiProvider);
