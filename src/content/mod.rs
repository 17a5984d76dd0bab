//! Content generation: step catalog, prompts, the generator boundary, and
//! email sequence plans.

pub mod generator;
pub mod prompts;
pub mod sequence;
pub mod steps;

pub use generator::{ContentGenerator, GeminiGenerator};
