//! libSQL implementation of the `Database` trait.
//!
//! One connection serves all operations; `libsql::Connection` is
//! `Send + Sync` and safe for concurrent async use. Profiles and email
//! sequences are stored as JSON columns.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{params, Connection, Database as LibSqlDatabase};
use tracing::info;
use uuid::Uuid;

use crate::crm::model::{Campaign, CampaignStatus, Contact, ContactStatus, SequenceEmail};
use crate::error::DatabaseError;
use crate::funnel::FunnelStage;
use crate::profile::Profile;
use crate::store::migrations;
use crate::store::traits::{ContactFilter, ContactPage, Database};

/// libSQL database backend.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a database file and bring its schema up to date.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Cannot create database directory: {e}"))
            })?;
        }
        let backend = Self::open(&path.to_string_lossy()).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// In-memory database for tests.
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        Self::open(":memory:").await
    }

    async fn open(target: &str) -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(target)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Cannot open libSQL database: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Cannot create connection: {e}")))?;

        migrations::run(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

fn query_err(e: libsql::Error) -> DatabaseError {
    DatabaseError::Query(e.to_string())
}

/// Convert `Option<String>` to libsql Value.
fn opt_text_owned(s: Option<String>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s),
        None => libsql::Value::Null,
    }
}

/// Parse an RFC 3339 datetime string (our canonical write format).
fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

const CONTACT_COLUMNS: &str =
    "id, name, email, phone, business_name, industry, budget, challenges, status, stage, created_at, updated_at";

fn row_to_contact(row: &libsql::Row) -> Result<Contact, DatabaseError> {
    let id_str: String = row.get(0).map_err(query_err)?;
    let challenges_json: String = row.get(7).map_err(query_err)?;
    let status_str: String = row.get(8).map_err(query_err)?;
    let stage_str: String = row.get(9).map_err(query_err)?;
    let created_str: String = row.get(10).map_err(query_err)?;
    let updated_str: String = row.get(11).map_err(query_err)?;

    let challenges: Vec<String> = serde_json::from_str(&challenges_json)
        .map_err(|e| DatabaseError::Serialization(format!("challenges column: {e}")))?;

    Ok(Contact {
        id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::nil()),
        profile: Profile {
            name: row.get(1).ok(),
            email: row.get(2).ok(),
            phone: row.get(3).ok(),
            business_name: row.get(4).ok(),
            industry: row.get(5).ok(),
            budget: row.get(6).ok(),
            challenges,
        },
        status: ContactStatus::parse(&status_str).unwrap_or(ContactStatus::Lead),
        stage: FunnelStage::parse_or_default(&stage_str),
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    })
}

const CAMPAIGN_COLUMNS: &str =
    "id, contact_id, funnel, current_step, email_sequence, status, next_email_at, created_at, updated_at";

fn row_to_campaign(row: &libsql::Row) -> Result<Campaign, DatabaseError> {
    let id_str: String = row.get(0).map_err(query_err)?;
    let contact_str: String = row.get(1).map_err(query_err)?;
    let funnel_str: String = row.get(2).map_err(query_err)?;
    let step: i64 = row.get(3).map_err(query_err)?;
    let sequence_json: String = row.get(4).map_err(query_err)?;
    let status_str: String = row.get(5).map_err(query_err)?;
    let next_email_str: Option<String> = row.get(6).ok();
    let created_str: String = row.get(7).map_err(query_err)?;
    let updated_str: String = row.get(8).map_err(query_err)?;

    let email_sequence: Vec<SequenceEmail> = serde_json::from_str(&sequence_json)
        .map_err(|e| DatabaseError::Serialization(format!("email_sequence column: {e}")))?;

    Ok(Campaign {
        id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::nil()),
        contact_id: Uuid::parse_str(&contact_str).unwrap_or_else(|_| Uuid::nil()),
        funnel: FunnelStage::parse_or_default(&funnel_str),
        current_step: step.clamp(1, 17) as u8,
        email_sequence,
        status: CampaignStatus::parse(&status_str).unwrap_or(CampaignStatus::Active),
        next_email_at: next_email_str.as_deref().map(parse_datetime),
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    })
}

fn sequence_to_json(sequence: &[SequenceEmail]) -> Result<String, DatabaseError> {
    serde_json::to_string(sequence)
        .map_err(|e| DatabaseError::Serialization(format!("email_sequence: {e}")))
}

#[async_trait]
impl Database for LibSqlBackend {
    // ── Contacts ────────────────────────────────────────────────────

    async fn insert_contact(&self, contact: &Contact) -> Result<(), DatabaseError> {
        let challenges = serde_json::to_string(&contact.profile.challenges)
            .map_err(|e| DatabaseError::Serialization(format!("challenges: {e}")))?;
        self.conn()
            .execute(
                "INSERT INTO contacts (id, name, email, phone, business_name, industry, budget, challenges, status, stage, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    contact.id.to_string(),
                    opt_text_owned(contact.profile.name.clone()),
                    opt_text_owned(contact.profile.email.clone()),
                    opt_text_owned(contact.profile.phone.clone()),
                    opt_text_owned(contact.profile.business_name.clone()),
                    opt_text_owned(contact.profile.industry.clone()),
                    opt_text_owned(contact.profile.budget.clone()),
                    challenges,
                    contact.status.as_str(),
                    contact.stage.as_str(),
                    contact.created_at.to_rfc3339(),
                    contact.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(query_err)?;
        Ok(())
    }

    async fn get_contact(&self, id: Uuid) -> Result<Option<Contact>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"),
                params![id.to_string()],
            )
            .await
            .map_err(query_err)?;
        match rows.next().await.map_err(query_err)? {
            Some(row) => Ok(Some(row_to_contact(&row)?)),
            None => Ok(None),
        }
    }

    async fn update_contact(&self, contact: &Contact) -> Result<(), DatabaseError> {
        let challenges = serde_json::to_string(&contact.profile.challenges)
            .map_err(|e| DatabaseError::Serialization(format!("challenges: {e}")))?;
        let affected = self
            .conn()
            .execute(
                "UPDATE contacts SET name = ?2, email = ?3, phone = ?4, business_name = ?5, industry = ?6, budget = ?7, challenges = ?8, status = ?9, stage = ?10, updated_at = ?11
                 WHERE id = ?1",
                params![
                    contact.id.to_string(),
                    opt_text_owned(contact.profile.name.clone()),
                    opt_text_owned(contact.profile.email.clone()),
                    opt_text_owned(contact.profile.phone.clone()),
                    opt_text_owned(contact.profile.business_name.clone()),
                    opt_text_owned(contact.profile.industry.clone()),
                    opt_text_owned(contact.profile.budget.clone()),
                    challenges,
                    contact.status.as_str(),
                    contact.stage.as_str(),
                    Utc::now().to_rfc3339(),
                ],
            )
            .await
            .map_err(query_err)?;
        if affected == 0 {
            return Err(DatabaseError::NotFound {
                entity: "contact".to_string(),
                id: contact.id.to_string(),
            });
        }
        Ok(())
    }

    async fn update_contact_status(
        &self,
        id: Uuid,
        status: ContactStatus,
    ) -> Result<(), DatabaseError> {
        let affected = self
            .conn()
            .execute(
                "UPDATE contacts SET status = ?2, updated_at = ?3 WHERE id = ?1",
                params![id.to_string(), status.as_str(), Utc::now().to_rfc3339()],
            )
            .await
            .map_err(query_err)?;
        if affected == 0 {
            return Err(DatabaseError::NotFound {
                entity: "contact".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn list_contacts(&self, filter: &ContactFilter) -> Result<ContactPage, DatabaseError> {
        // Status and stage come from closed enums, so interpolation is safe.
        let mut conditions = Vec::new();
        if let Some(status) = filter.status {
            conditions.push(format!("status = '{}'", status.as_str()));
        }
        if let Some(stage) = filter.stage {
            conditions.push(format!("stage = '{}'", stage.as_str()));
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter.limit.max(1);
        let offset = (filter.page.max(1) - 1) * limit;

        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {CONTACT_COLUMNS} FROM contacts {where_clause}
                     ORDER BY created_at DESC LIMIT {limit} OFFSET {offset}"
                ),
                (),
            )
            .await
            .map_err(query_err)?;

        let mut contacts = Vec::new();
        while let Some(row) = rows.next().await.map_err(query_err)? {
            contacts.push(row_to_contact(&row)?);
        }

        let mut count_rows = self
            .conn()
            .query(
                &format!("SELECT COUNT(*) FROM contacts {where_clause}"),
                (),
            )
            .await
            .map_err(query_err)?;
        let total = match count_rows.next().await.map_err(query_err)? {
            Some(row) => row.get::<i64>(0).map_err(query_err)? as u64,
            None => 0,
        };

        Ok(ContactPage {
            contacts,
            total,
            page: filter.page.max(1),
            limit,
        })
    }

    async fn search_contacts(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Contact>, DatabaseError> {
        // LIKE wildcards in the user's query are literal characters.
        let escaped = query
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{escaped}%");
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {CONTACT_COLUMNS} FROM contacts
                     WHERE name LIKE ?1 ESCAPE '\\'
                        OR email LIKE ?1 ESCAPE '\\'
                        OR business_name LIKE ?1 ESCAPE '\\'
                     ORDER BY created_at DESC LIMIT {limit}"
                ),
                params![pattern],
            )
            .await
            .map_err(query_err)?;

        let mut contacts = Vec::new();
        while let Some(row) = rows.next().await.map_err(query_err)? {
            contacts.push(row_to_contact(&row)?);
        }
        Ok(contacts)
    }

    async fn count_contacts_by_status(
        &self,
    ) -> Result<Vec<(ContactStatus, u64)>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT status, COUNT(*) FROM contacts GROUP BY status ORDER BY status",
                (),
            )
            .await
            .map_err(query_err)?;

        let mut counts = Vec::new();
        while let Some(row) = rows.next().await.map_err(query_err)? {
            let status_str: String = row.get(0).map_err(query_err)?;
            let count: i64 = row.get(1).map_err(query_err)?;
            if let Some(status) = ContactStatus::parse(&status_str) {
                counts.push((status, count as u64));
            }
        }
        Ok(counts)
    }

    async fn count_contacts_by_stage(
        &self,
    ) -> Result<Vec<(FunnelStage, u64)>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT stage, COUNT(*) FROM contacts GROUP BY stage ORDER BY stage",
                (),
            )
            .await
            .map_err(query_err)?;

        let mut counts = Vec::new();
        while let Some(row) = rows.next().await.map_err(query_err)? {
            let stage_str: String = row.get(0).map_err(query_err)?;
            let count: i64 = row.get(1).map_err(query_err)?;
            counts.push((FunnelStage::parse_or_default(&stage_str), count as u64));
        }
        Ok(counts)
    }

    async fn recent_contacts(&self, limit: u32) -> Result<Vec<Contact>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY created_at DESC LIMIT {limit}"
                ),
                (),
            )
            .await
            .map_err(query_err)?;

        let mut contacts = Vec::new();
        while let Some(row) = rows.next().await.map_err(query_err)? {
            contacts.push(row_to_contact(&row)?);
        }
        Ok(contacts)
    }

    // ── Campaigns ───────────────────────────────────────────────────

    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO campaigns (id, contact_id, funnel, current_step, email_sequence, status, next_email_at, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    campaign.id.to_string(),
                    campaign.contact_id.to_string(),
                    campaign.funnel.as_str(),
                    campaign.current_step as i64,
                    sequence_to_json(&campaign.email_sequence)?,
                    campaign.status.as_str(),
                    opt_text_owned(campaign.next_email_at.map(|dt| dt.to_rfc3339())),
                    campaign.created_at.to_rfc3339(),
                    campaign.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(query_err)?;
        Ok(())
    }

    async fn get_campaign(&self, id: Uuid) -> Result<Option<Campaign>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = ?1"),
                params![id.to_string()],
            )
            .await
            .map_err(query_err)?;
        match rows.next().await.map_err(query_err)? {
            Some(row) => Ok(Some(row_to_campaign(&row)?)),
            None => Ok(None),
        }
    }

    async fn campaigns_for_contact(
        &self,
        contact_id: Uuid,
    ) -> Result<Vec<Campaign>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE contact_id = ?1
                     ORDER BY created_at DESC"
                ),
                params![contact_id.to_string()],
            )
            .await
            .map_err(query_err)?;

        let mut campaigns = Vec::new();
        while let Some(row) = rows.next().await.map_err(query_err)? {
            campaigns.push(row_to_campaign(&row)?);
        }
        Ok(campaigns)
    }

    async fn update_campaign(&self, campaign: &Campaign) -> Result<(), DatabaseError> {
        let affected = self
            .conn()
            .execute(
                "UPDATE campaigns SET funnel = ?2, current_step = ?3, email_sequence = ?4, status = ?5, next_email_at = ?6, updated_at = ?7
                 WHERE id = ?1",
                params![
                    campaign.id.to_string(),
                    campaign.funnel.as_str(),
                    campaign.current_step as i64,
                    sequence_to_json(&campaign.email_sequence)?,
                    campaign.status.as_str(),
                    opt_text_owned(campaign.next_email_at.map(|dt| dt.to_rfc3339())),
                    Utc::now().to_rfc3339(),
                ],
            )
            .await
            .map_err(query_err)?;
        if affected == 0 {
            return Err(DatabaseError::NotFound {
                entity: "campaign".to_string(),
                id: campaign.id.to_string(),
            });
        }
        Ok(())
    }

    async fn count_campaigns_with_status(
        &self,
        status: CampaignStatus,
    ) -> Result<u64, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT COUNT(*) FROM campaigns WHERE status = ?1",
                params![status.as_str()],
            )
            .await
            .map_err(query_err)?;
        match rows.next().await.map_err(query_err)? {
            Some(row) => Ok(row.get::<i64>(0).map_err(query_err)? as u64),
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_contact(budget: &str) -> Contact {
        Contact::new(
            Profile {
                name: Some("Ana".into()),
                email: Some("ana@example.com".into()),
                business_name: Some("Panadería Sol".into()),
                budget: Some(budget.into()),
                challenges: vec!["pocas ventas".into()],
                ..Profile::default()
            },
            FunnelStage::classify(Some(budget)),
        )
    }

    #[tokio::test]
    async fn contact_round_trip() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        let contact = sample_contact("Más de $5000");
        db.insert_contact(&contact).await.unwrap();

        let loaded = db.get_contact(contact.id).await.unwrap().unwrap();
        assert_eq!(loaded.profile.name.as_deref(), Some("Ana"));
        assert_eq!(loaded.stage, FunnelStage::Relationship);
        assert_eq!(loaded.status, ContactStatus::Lead);
        assert_eq!(loaded.profile.challenges, vec!["pocas ventas".to_string()]);
    }

    #[tokio::test]
    async fn missing_contact_is_none() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        assert!(db.get_contact(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn status_update_and_filtering() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        let a = sample_contact("$2000-$2999");
        let b = sample_contact("Menos de $500");
        db.insert_contact(&a).await.unwrap();
        db.insert_contact(&b).await.unwrap();

        db.update_contact_status(a.id, ContactStatus::Customer)
            .await
            .unwrap();

        let page = db
            .list_contacts(&ContactFilter {
                status: Some(ContactStatus::Customer),
                ..ContactFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.contacts[0].id, a.id);

        let page = db
            .list_contacts(&ContactFilter {
                stage: Some(FunnelStage::Attraction),
                ..ContactFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.contacts[0].id, b.id);
    }

    #[tokio::test]
    async fn update_unknown_contact_is_not_found() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        let err = db
            .update_contact_status(Uuid::new_v4(), ContactStatus::Lost)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[tokio::test]
    async fn search_matches_name_email_and_business() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        db.insert_contact(&sample_contact("$1000-$1999")).await.unwrap();

        assert_eq!(db.search_contacts("Ana", 20).await.unwrap().len(), 1);
        assert_eq!(db.search_contacts("example.com", 20).await.unwrap().len(), 1);
        assert_eq!(db.search_contacts("Panadería", 20).await.unwrap().len(), 1);
        assert!(db.search_contacts("nomatch", 20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_treats_like_wildcards_as_literals() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        db.insert_contact(&sample_contact("$1000-$1999")).await.unwrap();
        db.insert_contact(&Contact::new(
            Profile {
                name: Some("100% Natural".into()),
                ..Profile::default()
            },
            FunnelStage::Attraction,
        ))
        .await
        .unwrap();

        // Wildcards only match their literal occurrences, never everything.
        let percent_hits = db.search_contacts("%", 20).await.unwrap();
        assert_eq!(percent_hits.len(), 1);
        assert_eq!(percent_hits[0].profile.name.as_deref(), Some("100% Natural"));
        assert!(db.search_contacts("___", 20).await.unwrap().is_empty());
        assert_eq!(db.search_contacts("100%", 20).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn campaign_round_trip_with_sequence() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        let contact = sample_contact("$4000-$4999");
        db.insert_contact(&contact).await.unwrap();

        let mut campaign = Campaign::new(contact.id, contact.stage);
        db.insert_campaign(&campaign).await.unwrap();

        campaign.email_sequence = vec![SequenceEmail {
            email_number: 1,
            subject: "Email 1 - relationship".into(),
            content: "hola".into(),
            step: 1,
            content_type: "Email 1 - Bienvenida + Video".into(),
            sent_at: Some(Utc::now()),
            opened: true,
            clicked: false,
        }];
        campaign.status = CampaignStatus::Paused;
        db.update_campaign(&campaign).await.unwrap();

        let loaded = db.get_campaign(campaign.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, CampaignStatus::Paused);
        assert_eq!(loaded.email_sequence.len(), 1);
        assert!(loaded.email_sequence[0].opened);
        assert!(loaded.email_sequence[0].sent_at.is_some());

        let by_contact = db.campaigns_for_contact(contact.id).await.unwrap();
        assert_eq!(by_contact.len(), 1);

        assert_eq!(
            db.count_campaigns_with_status(CampaignStatus::Paused)
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            db.count_campaigns_with_status(CampaignStatus::Active)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn local_file_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("funnelcraft.db");

        let contact = sample_contact("$3000-$3999");
        {
            let db = LibSqlBackend::new_local(&path).await.unwrap();
            db.insert_contact(&contact).await.unwrap();
        }

        // Reopen: migrations are idempotent and the data survives.
        let db = LibSqlBackend::new_local(&path).await.unwrap();
        let loaded = db.get_contact(contact.id).await.unwrap().unwrap();
        assert_eq!(loaded.stage, FunnelStage::Conversion);
    }

    #[tokio::test]
    async fn breakdown_counts() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        db.insert_contact(&sample_contact("Más de $5000")).await.unwrap();
        db.insert_contact(&sample_contact("Más de $5000")).await.unwrap();
        db.insert_contact(&sample_contact("$2000-$2999")).await.unwrap();

        let by_stage = db.count_contacts_by_stage().await.unwrap();
        assert!(by_stage.contains(&(FunnelStage::Relationship, 2)));
        assert!(by_stage.contains(&(FunnelStage::Conversion, 1)));

        let by_status = db.count_contacts_by_status().await.unwrap();
        assert_eq!(by_status, vec![(ContactStatus::Lead, 3)]);
    }
}
