//! Contact and campaign records tracked by the CRM.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::funnel::FunnelStage;
use crate::profile::Profile;

/// Lifecycle status of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    Lead,
    Opportunity,
    Prospect,
    Customer,
    RepeatCustomer,
    Inactive,
    Lost,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Opportunity => "opportunity",
            Self::Prospect => "prospect",
            Self::Customer => "customer",
            Self::RepeatCustomer => "repeat_customer",
            Self::Inactive => "inactive",
            Self::Lost => "lost",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "lead" => Some(Self::Lead),
            "opportunity" => Some(Self::Opportunity),
            "prospect" => Some(Self::Prospect),
            "customer" => Some(Self::Customer),
            "repeat_customer" => Some(Self::RepeatCustomer),
            "inactive" => Some(Self::Inactive),
            "lost" => Some(Self::Lost),
            _ => None,
        }
    }

    /// All statuses, in pipeline order.
    pub fn all() -> [ContactStatus; 7] {
        [
            Self::Lead,
            Self::Opportunity,
            Self::Prospect,
            Self::Customer,
            Self::RepeatCustomer,
            Self::Inactive,
            Self::Lost,
        ]
    }
}

impl std::fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lead tracked through the funnel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub profile: Profile,
    pub status: ContactStatus,
    pub stage: FunnelStage,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// Create a new Lead from an initial form submission.
    pub fn new(profile: Profile, stage: FunnelStage) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            profile,
            status: ContactStatus::Lead,
            stage,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Status of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Active,
    Paused,
    Completed,
    Cancelled,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "paused" => Some(Self::Paused),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One email in a campaign's generated sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceEmail {
    pub email_number: u32,
    pub subject: String,
    pub content: String,
    /// Methodology step the email is built on.
    pub step: u8,
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub opened: bool,
    #[serde(default)]
    pub clicked: bool,
}

/// A marketing campaign for one contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub funnel: FunnelStage,
    /// Current methodology step, 1–17.
    pub current_step: u8,
    pub email_sequence: Vec<SequenceEmail>,
    pub status: CampaignStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_email_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// Create a fresh campaign at step 1 with no sequence yet.
    pub fn new(contact_id: Uuid, funnel: FunnelStage) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            contact_id,
            funnel,
            current_step: 1,
            email_sequence: Vec::new(),
            status: CampaignStatus::Active,
            next_email_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
