//! Guided chat wizard over the 17-step methodology.

pub mod engine;

pub use engine::{
    CLARIFICATION_MESSAGE, MIN_ACCEPTED_CHARS, RetryReason, WizardEngine, WizardState, WizardTurn,
};
