//! # LLM Invocation Ladder
//!
//! One analysis run calls the provider through a fixed ladder of three
//! tiers, ordered by how much structure the endpoint enforces:
//!
//! 1. Structured shape with forced-JSON output.
//! 2. Conversational shape with forced-JSON output.
//! 3. Conversational shape with a plain-text JSON instruction, followed
//!    by JSON extraction from the raw reply.
//!
//! A capability mismatch is the only failure that advances a tier; any
//! other error propagates to the retry wrapper, which re-runs the whole
//! ladder from tier 1 with exponential backoff.

use crate::{errors::InsightError, extract::extract_json, providers::ai::AiProvider};
use std::time::Duration;
use tracing::{debug, warn};

const PLAIN_JSON_INSTRUCTION: &str = "\n\nReturn ONLY valid JSON (no extra commentary).";

/// The retry schedule applied around the full tier ladder.
///
/// Delays are computed without sleeping so the schedule is testable on
/// its own; the invoker drives the actual waits through `tokio::time`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(600),
        }
    }
}

impl RetryPolicy {
    /// The backoff delay after the attempt with the given zero-based
    /// index: `base_delay * 2^attempt_index`.
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt_index)
    }
}

/// Runs the three call tiers in strict priority order.
///
/// Returns the raw text of the first tier that succeeds. Tiers 1 and 2
/// fall through only on a capability mismatch; tier 3 pipes its reply
/// through JSON extraction so every tier hands back a JSON string.
async fn run_ladder(
    provider: &dyn AiProvider,
    system_prompt: &str,
    user_prompt: &str,
) -> Result<String, InsightError> {
    match provider.generate_structured(system_prompt, user_prompt).await {
        Ok(text) => return Ok(text),
        Err(e) if e.is_capability_mismatch() => {
            warn!("structured tier unavailable, falling back to chat: {e}");
        }
        Err(e) => return Err(e),
    }

    match provider.generate_chat(system_prompt, user_prompt, true).await {
        Ok(text) => return Ok(text),
        Err(e) if e.is_capability_mismatch() => {
            warn!("forced-JSON chat tier unavailable, falling back to plain chat: {e}");
        }
        Err(e) => return Err(e),
    }

    let plain_prompt = format!("{user_prompt}{PLAIN_JSON_INSTRUCTION}");
    let raw = provider
        .generate_chat(system_prompt, &plain_prompt, false)
        .await?;
    let value = extract_json(&raw)?;
    serde_json::to_string(&value).map_err(|e| InsightError::Extraction(e.to_string()))
}

/// Invokes the provider with retries around the full tier ladder.
///
/// Every attempt restarts at tier 1; a later tier succeeding on one
/// attempt does not pin future attempts to it. Exhausting the policy
/// surfaces the last failure, wrapped so operators can tell an outage
/// from a contract problem.
pub async fn invoke(
    provider: &dyn AiProvider,
    system_prompt: &str,
    user_prompt: &str,
    policy: &RetryPolicy,
) -> Result<String, InsightError> {
    let mut last_error: Option<InsightError> = None;

    for attempt in 0..policy.max_attempts {
        if attempt > 0 {
            let delay = policy.delay_for(attempt - 1);
            debug!("retry attempt {} after {delay:?}", attempt + 1);
            tokio::time::sleep(delay).await;
        }

        match run_ladder(provider, system_prompt, user_prompt).await {
            Ok(text) => return Ok(text),
            Err(e) => {
                warn!("attempt {} failed: {e}", attempt + 1);
                last_error = Some(e);
            }
        }
    }

    Err(InsightError::RetriesExhausted {
        attempts: policy.max_attempts,
        source: Box::new(last_error.unwrap_or(InsightError::AiApi(
            "retry policy allowed no attempts".to_string(),
        ))),
    })
}
