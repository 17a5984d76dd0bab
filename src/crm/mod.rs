//! CRM domain types: contacts and email campaigns.

pub mod model;

pub use model::{Campaign, CampaignStatus, Contact, ContactStatus, SequenceEmail};
