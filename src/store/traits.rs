//! Unified `Database` trait — single async interface for CRM persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::crm::model::{Campaign, CampaignStatus, Contact, ContactStatus};
use crate::error::DatabaseError;
use crate::funnel::FunnelStage;

/// Filter and pagination for contact listings.
#[derive(Debug, Clone)]
pub struct ContactFilter {
    pub status: Option<ContactStatus>,
    pub stage: Option<FunnelStage>,
    /// Page size.
    pub limit: u32,
    /// 1-based page number.
    pub page: u32,
}

impl Default for ContactFilter {
    fn default() -> Self {
        Self {
            status: None,
            stage: None,
            limit: 50,
            page: 1,
        }
    }
}

/// One page of contacts plus the total match count.
#[derive(Debug, Clone)]
pub struct ContactPage {
    pub contacts: Vec<Contact>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl ContactPage {
    /// Total number of pages for this filter.
    pub fn pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.limit as u64)
    }
}

/// Backend-agnostic database trait covering contacts and campaigns.
#[async_trait]
pub trait Database: Send + Sync {
    // ── Contacts ────────────────────────────────────────────────────

    async fn insert_contact(&self, contact: &Contact) -> Result<(), DatabaseError>;

    async fn get_contact(&self, id: Uuid) -> Result<Option<Contact>, DatabaseError>;

    /// Persist an updated contact (profile, stage, status).
    async fn update_contact(&self, contact: &Contact) -> Result<(), DatabaseError>;

    async fn update_contact_status(
        &self,
        id: Uuid,
        status: ContactStatus,
    ) -> Result<(), DatabaseError>;

    /// List contacts matching the filter, most recent first.
    async fn list_contacts(&self, filter: &ContactFilter) -> Result<ContactPage, DatabaseError>;

    /// Case-insensitive substring search over name, email, and business name.
    async fn search_contacts(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Contact>, DatabaseError>;

    /// Contact counts grouped by lifecycle status (absent statuses omitted).
    async fn count_contacts_by_status(
        &self,
    ) -> Result<Vec<(ContactStatus, u64)>, DatabaseError>;

    /// Contact counts grouped by funnel stage (absent stages omitted).
    async fn count_contacts_by_stage(&self) -> Result<Vec<(FunnelStage, u64)>, DatabaseError>;

    /// Most recently created contacts.
    async fn recent_contacts(&self, limit: u32) -> Result<Vec<Contact>, DatabaseError>;

    // ── Campaigns ───────────────────────────────────────────────────

    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), DatabaseError>;

    async fn get_campaign(&self, id: Uuid) -> Result<Option<Campaign>, DatabaseError>;

    async fn campaigns_for_contact(
        &self,
        contact_id: Uuid,
    ) -> Result<Vec<Campaign>, DatabaseError>;

    /// Persist an updated campaign (funnel, step, sequence, status).
    async fn update_campaign(&self, campaign: &Campaign) -> Result<(), DatabaseError>;

    async fn count_campaigns_with_status(
        &self,
        status: CampaignStatus,
    ) -> Result<u64, DatabaseError>;
}
