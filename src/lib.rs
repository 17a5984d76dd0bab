//! funnelcraft — AI marketing funnel and copywriting service.
//!
//! Captures lead-qualification forms, classifies leads into one of three
//! marketing funnels, drives a 17-step guided copywriting wizard backed by
//! the Gemini API, assembles landing-page copy into renderable HTML, and
//! tracks contacts and email campaigns in a libSQL store.

pub mod api;
pub mod config;
pub mod content;
pub mod crm;
pub mod error;
pub mod funnel;
pub mod landing;
pub mod mailer;
pub mod profile;
pub mod store;
pub mod wizard;

pub use error::{Error, Result};
