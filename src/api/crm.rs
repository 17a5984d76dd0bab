//! CRM endpoints: contact listing, pipeline breakdowns, and reports.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::crm::model::{CampaignStatus, ContactStatus};
use crate::funnel::FunnelStage;
use crate::store::ContactFilter;

use super::{db_error, error_json, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/crm/contacts", get(list_contacts))
        .route("/api/crm/contacts/{id}", get(get_contact))
        .route("/api/crm/contacts/{id}/status", put(update_status))
        .route("/api/crm/pipeline", get(pipeline))
        .route("/api/crm/reports", get(reports))
        .route("/api/crm/search", get(search))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    stage: Option<String>,
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default)]
    page: Option<u32>,
}

/// GET /api/crm/contacts
///
/// Paginated listing with optional status and stage filters.
async fn list_contacts(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let status = match &query.status {
        Some(s) => match ContactStatus::parse(s) {
            Some(status) => Some(status),
            None => {
                return error_json(StatusCode::BAD_REQUEST, format!("Unknown status: {s}"))
                    .into_response();
            }
        },
        None => None,
    };
    let stage = query
        .stage
        .as_deref()
        .map(FunnelStage::parse_or_default);

    let defaults = ContactFilter::default();
    let filter = ContactFilter {
        status,
        stage,
        limit: query.limit.unwrap_or(defaults.limit).clamp(1, 200),
        page: query.page.unwrap_or(defaults.page).max(1),
    };

    match state.db.list_contacts(&filter).await {
        Ok(page) => Json(serde_json::json!({
            "contacts": page.contacts,
            "total": page.total,
            "page": page.page,
            "pages": page.pages(),
            "limit": page.limit,
        }))
        .into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

/// GET /api/crm/contacts/{id}
///
/// One contact together with its campaigns.
async fn get_contact(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let contact = match state.db.get_contact(id).await {
        Ok(Some(contact)) => contact,
        Ok(None) => {
            return error_json(StatusCode::NOT_FOUND, format!("contact {id} not found"))
                .into_response();
        }
        Err(e) => return db_error(e).into_response(),
    };
    match state.db.campaigns_for_contact(id).await {
        Ok(campaigns) => Json(serde_json::json!({
            "contact": contact,
            "campaigns": campaigns,
        }))
        .into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct StatusUpdate {
    status: ContactStatus,
}

/// PUT /api/crm/contacts/{id}/status
async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<StatusUpdate>,
) -> Response {
    match state.db.update_contact_status(id, update.status).await {
        Ok(()) => Json(serde_json::json!({
            "contactId": id,
            "status": update.status,
        }))
        .into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

/// GET /api/crm/pipeline
///
/// Contact counts broken down by status and by funnel stage.
async fn pipeline(State(state): State<AppState>) -> Response {
    let by_status = match state.db.count_contacts_by_status().await {
        Ok(counts) => counts,
        Err(e) => return db_error(e).into_response(),
    };
    let by_stage = match state.db.count_contacts_by_stage().await {
        Ok(counts) => counts,
        Err(e) => return db_error(e).into_response(),
    };

    let status_map: serde_json::Map<String, serde_json::Value> = by_status
        .into_iter()
        .map(|(status, count)| (status.as_str().to_string(), count.into()))
        .collect();
    let stage_map: serde_json::Map<String, serde_json::Value> = by_stage
        .into_iter()
        .map(|(stage, count)| (stage.as_str().to_string(), count.into()))
        .collect();

    Json(serde_json::json!({
        "byStatus": status_map,
        "byStage": stage_map,
    }))
    .into_response()
}

/// GET /api/crm/reports
///
/// Summary report: totals, breakdowns, active campaigns, latest leads.
async fn reports(State(state): State<AppState>) -> Response {
    let by_status = match state.db.count_contacts_by_status().await {
        Ok(counts) => counts,
        Err(e) => return db_error(e).into_response(),
    };
    let total: u64 = by_status.iter().map(|(_, count)| count).sum();

    let active_campaigns = match state
        .db
        .count_campaigns_with_status(CampaignStatus::Active)
        .await
    {
        Ok(count) => count,
        Err(e) => return db_error(e).into_response(),
    };
    let recent = match state.db.recent_contacts(5).await {
        Ok(contacts) => contacts,
        Err(e) => return db_error(e).into_response(),
    };

    let status_map: serde_json::Map<String, serde_json::Value> = by_status
        .into_iter()
        .map(|(status, count)| (status.as_str().to_string(), count.into()))
        .collect();

    Json(serde_json::json!({
        "totalContacts": total,
        "byStatus": status_map,
        "activeCampaigns": active_campaigns,
        "recentContacts": recent,
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    limit: Option<u32>,
}

/// GET /api/crm/search?q=
async fn search(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> Response {
    let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
        return error_json(StatusCode::BAD_REQUEST, "Missing search query").into_response();
    };
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    match state.db.search_contacts(q, limit).await {
        Ok(contacts) => Json(serde_json::json!({ "contacts": contacts })).into_response(),
        Err(e) => db_error(e).into_response(),
    }
}
