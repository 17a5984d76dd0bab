//! Form endpoints: lead capture plus the per-funnel qualification forms
//! that regenerate a campaign's email sequence.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::content::sequence::{self, SEQUENCE_PACE};
use crate::crm::model::{Campaign, Contact};
use crate::funnel::FunnelStage;
use crate::profile::Profile;

use super::{db_error, error_json, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/forms/initial", post(initial_form))
        .route("/api/forms/attraction", post(attraction_form))
        .route("/api/forms/conversion", post(conversion_form))
        .route("/api/forms/relationship", post(relationship_form))
}

/// POST /api/forms/initial
///
/// First lead capture: classifies the funnel from the declared budget and
/// creates the contact plus an empty campaign.
async fn initial_form(State(state): State<AppState>, Json(profile): Json<Profile>) -> Response {
    let stage = FunnelStage::classify(profile.budget.as_deref());
    let contact = Contact::new(profile, stage);
    let campaign = Campaign::new(contact.id, stage);

    if let Err(e) = state.db.insert_contact(&contact).await {
        return db_error(e).into_response();
    }
    if let Err(e) = state.db.insert_campaign(&campaign).await {
        return db_error(e).into_response();
    }

    info!(contact_id = %contact.id, stage = %stage, "New lead captured");
    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "contactId": contact.id,
            "campaignId": campaign.id,
            "funnelStage": stage,
        })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FunnelFormRequest {
    contact_id: Uuid,
    #[serde(flatten)]
    profile: Profile,
}

async fn attraction_form(
    State(state): State<AppState>,
    Json(request): Json<FunnelFormRequest>,
) -> Response {
    funnel_form(state, request, FunnelStage::Attraction).await
}

async fn conversion_form(
    State(state): State<AppState>,
    Json(request): Json<FunnelFormRequest>,
) -> Response {
    funnel_form(state, request, FunnelStage::Conversion).await
}

async fn relationship_form(
    State(state): State<AppState>,
    Json(request): Json<FunnelFormRequest>,
) -> Response {
    funnel_form(state, request, FunnelStage::Relationship).await
}

/// Shared handler for the three funnel qualification forms.
///
/// Merges the submitted profile into the contact, pins the contact to the
/// route's funnel stage, regenerates the email sequence, and stores it on
/// the contact's campaign (creating one if none exists).
async fn funnel_form(state: AppState, request: FunnelFormRequest, stage: FunnelStage) -> Response {
    let mut contact = match state.db.get_contact(request.contact_id).await {
        Ok(Some(contact)) => contact,
        Ok(None) => {
            return error_json(
                StatusCode::NOT_FOUND,
                format!("contact {} not found", request.contact_id),
            )
            .into_response();
        }
        Err(e) => return db_error(e).into_response(),
    };

    contact.profile.merge(request.profile);
    contact.stage = stage;
    if let Err(e) = state.db.update_contact(&contact).await {
        return db_error(e).into_response();
    }

    let pace = state.pace_override.unwrap_or(SEQUENCE_PACE);
    let generator: Arc<dyn crate::content::ContentGenerator> = state.generator.clone();
    let emails = sequence::build_sequence(&generator, &contact.profile, stage, pace).await;

    let campaigns = match state.db.campaigns_for_contact(contact.id).await {
        Ok(campaigns) => campaigns,
        Err(e) => return db_error(e).into_response(),
    };

    let (mut campaign, is_new) = match campaigns.into_iter().next() {
        Some(existing) => (existing, false),
        None => (Campaign::new(contact.id, stage), true),
    };
    campaign.funnel = stage;
    campaign.email_sequence = emails;

    let store_result = if is_new {
        state.db.insert_campaign(&campaign).await
    } else {
        state.db.update_campaign(&campaign).await
    };
    if let Err(e) = store_result {
        return db_error(e).into_response();
    }

    info!(
        contact_id = %contact.id,
        campaign_id = %campaign.id,
        stage = %stage,
        emails = campaign.email_sequence.len(),
        "Funnel form processed"
    );
    Json(serde_json::json!({
        "contactId": contact.id,
        "campaignId": campaign.id,
        "funnelStage": stage,
        "emailCount": campaign.email_sequence.len(),
    }))
    .into_response()
}
