//! Wizard engine — advances a conversation through the 17 methodology steps.
//!
//! The engine is a pure transition function: the caller owns the state
//! (step + profile) and receives the updated step back. Nothing is stored
//! between invocations.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::content::steps;
use crate::content::ContentGenerator;
use crate::error::WizardError;
use crate::funnel::FunnelStage;
use crate::profile::Profile;

/// Minimum trimmed length (in characters) for a generated answer to count.
/// A deliberate low bar against near-empty or degenerate model output.
pub const MIN_ACCEPTED_CHARS: usize = 20;

/// Fixed response when a step has to be repeated.
pub const CLARIFICATION_MESSAGE: &str =
    "Necesito un poco más de detalle para este paso. ¿Puedes contarme más sobre tu negocio y lo que quieres lograr?";

/// Caller-owned wizard state for one conversation.
#[derive(Debug, Clone)]
pub struct WizardState {
    /// Current methodology step. Validated by `advance`, not here.
    pub current_step: u8,
    pub profile: Profile,
}

/// Why a turn did not advance.
///
/// Externally the response text is identical for both cases; this field
/// makes the distinction observable to callers that want it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryReason {
    /// The generation call failed outright.
    GenerationFailed,
    /// Generation succeeded but the text was below the acceptance bar.
    TooShort,
}

/// Outcome of one wizard turn.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardTurn {
    pub response: String,
    /// Step for the next turn; `None` once the flow is complete.
    pub next_step: Option<u8>,
    pub is_complete: bool,
    pub funnel_stage: FunnelStage,
    /// round(step / 17 * 100) — informational only.
    pub progress_percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_reason: Option<RetryReason>,
}

/// Drives one conversation through steps 1–17.
pub struct WizardEngine {
    generator: Arc<dyn ContentGenerator>,
}

impl WizardEngine {
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self { generator }
    }

    /// Run one wizard turn.
    ///
    /// Invariants: the returned `next_step` is never below
    /// `state.current_step` and never above 17. A failed or too-short
    /// generation repeats the current step with a fixed clarification
    /// message.
    pub async fn advance(&self, state: &WizardState) -> Result<WizardTurn, WizardError> {
        let Some(info) = steps::step(state.current_step) else {
            return Err(WizardError::InvalidStep {
                step: state.current_step as i64,
            });
        };

        let funnel = FunnelStage::classify(state.profile.budget.as_deref());
        let progress = progress_percent(state.current_step);

        let generated = self
            .generator
            .generate(&state.profile, funnel, info.number, info.content_type)
            .await;

        let (accepted, retry_reason) = match &generated {
            Ok(text) if text.trim().chars().count() >= MIN_ACCEPTED_CHARS => (true, None),
            Ok(_) => (false, Some(RetryReason::TooShort)),
            Err(e) => {
                warn!(step = info.number, error = %e, "Generation failed during wizard turn");
                (false, Some(RetryReason::GenerationFailed))
            }
        };

        if !accepted {
            debug!(step = info.number, ?retry_reason, "Repeating step");
            return Ok(WizardTurn {
                response: CLARIFICATION_MESSAGE.to_string(),
                next_step: Some(state.current_step),
                is_complete: false,
                funnel_stage: funnel,
                progress_percent: progress,
                retry_reason,
            });
        }

        // Generated is known Ok here.
        let response = generated.unwrap_or_default();
        let is_complete = state.current_step == steps::STEP_COUNT;
        let next_step = if is_complete {
            None
        } else {
            Some(state.current_step + 1)
        };

        Ok(WizardTurn {
            response,
            next_step,
            is_complete,
            funnel_stage: funnel,
            progress_percent: progress,
            retry_reason: None,
        })
    }
}

/// Informational progress metric.
pub fn progress_percent(step: u8) -> u8 {
    ((step as f32 / steps::STEP_COUNT as f32) * 100.0).round() as u8
}
