//! Content endpoints: the 17-step wizard, landing copy assembly, the
//! landing renderer, single-shot generation, and campaign sequence
//! preview/approval.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::content::sequence::{self, SEQUENCE_PACE};
use crate::content::steps;
use crate::crm::model::CampaignStatus;
use crate::funnel::FunnelStage;
use crate::landing::{self, CopyAssembler, CopyDocument, SectionSet};
use crate::profile::Profile;
use crate::wizard::{WizardEngine, WizardState};

use super::{db_error, error_json, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/content/wizard", post(wizard_turn))
        .route("/api/content/copy", post(assemble_copy))
        .route("/api/content/landing", post(render_landing))
        .route("/api/content/generate", post(generate_single))
        .route("/api/content/step/{step}", post(generate_for_step))
        .route("/api/content/preview/{campaign_id}", get(preview_sequence))
        .route("/api/content/approve/{campaign_id}", post(approve_campaign))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WizardRequest {
    step: i64,
    #[serde(default)]
    input: Option<String>,
    #[serde(default)]
    profile: Option<Profile>,
}

/// POST /api/content/wizard
///
/// One wizard turn: merges the user's answer into the profile and asks the
/// engine for the step's content. Rejected turns repeat the step.
async fn wizard_turn(
    State(state): State<AppState>,
    Json(request): Json<WizardRequest>,
) -> Response {
    if !steps::is_valid_step(request.step) {
        return error_json(
            StatusCode::BAD_REQUEST,
            format!("Step {} is outside the valid range 1-17", request.step),
        )
        .into_response();
    }

    let mut profile = request.profile.unwrap_or_default();
    if let Some(input) = &request.input {
        profile.record_answer(input);
    }

    let engine = WizardEngine::new(state.generator.clone());
    let wizard_state = WizardState {
        current_step: request.step as u8,
        profile,
    };

    match engine.advance(&wizard_state).await {
        Ok(turn) => Json(turn).into_response(),
        Err(e) => error_json(StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CopyRequest {
    #[serde(default)]
    profile: Option<Profile>,
    /// Generate the full 14-section set instead of the 5 required ones.
    #[serde(default)]
    full: bool,
}

/// POST /api/content/copy
///
/// Assembles the landing copy. When required sections remain missing after
/// the bounded retries, responds 422 with the missing list and the partial
/// copy so the caller can still render what exists.
async fn assemble_copy(
    State(state): State<AppState>,
    Json(request): Json<CopyRequest>,
) -> Response {
    let profile = request.profile.unwrap_or_default();
    let funnel = FunnelStage::classify(profile.budget.as_deref());
    let set = if request.full {
        SectionSet::Full
    } else {
        SectionSet::Minimal
    };

    let mut assembler = CopyAssembler::new(state.generator.clone());
    if let Some(pace) = state.pace_override {
        assembler = assembler.with_pace(pace);
    }

    let result = assembler.assemble(&profile, funnel, set).await;
    if result.is_complete() {
        Json(result).into_response()
    } else {
        (StatusCode::UNPROCESSABLE_ENTITY, Json(result)).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct LandingRequest {
    #[serde(default)]
    copy: Option<CopyDocument>,
}

/// POST /api/content/landing
///
/// Pure rendering: a copy document in, an HTML page out.
async fn render_landing(Json(request): Json<LandingRequest>) -> Response {
    match request.copy {
        Some(copy) => Json(serde_json::json!({ "html": landing::render(&copy) })).into_response(),
        None => error_json(StatusCode::BAD_REQUEST, "Missing copy object").into_response(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(default)]
    profile: Option<Profile>,
    #[serde(default = "default_step")]
    step: i64,
    #[serde(default)]
    content_type: Option<String>,
}

fn default_step() -> i64 {
    1
}

/// POST /api/content/generate
///
/// Single-shot generation for an arbitrary step, with an optional custom
/// content-type override.
async fn generate_single(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    let Some(info) = i64_step(request.step) else {
        return error_json(
            StatusCode::BAD_REQUEST,
            format!("Step {} is outside the valid range 1-17", request.step),
        )
        .into_response();
    };

    let profile = request.profile.unwrap_or_default();
    let funnel = FunnelStage::classify(profile.budget.as_deref());
    let content_type = request
        .content_type
        .as_deref()
        .unwrap_or(info.content_type);

    match state
        .generator
        .generate(&profile, funnel, info.number, content_type)
        .await
    {
        Ok(content) => Json(serde_json::json!({
            "content": content,
            "step": info.number,
            "funnelStage": funnel,
        }))
        .into_response(),
        Err(e) => {
            tracing::warn!(step = info.number, error = %e, "Single-shot generation failed");
            error_json(StatusCode::BAD_GATEWAY, "Content generation failed").into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct StepRequest {
    #[serde(default)]
    profile: Option<Profile>,
}

/// POST /api/content/step/{step}
///
/// Generate the catalog content for one methodology step.
async fn generate_for_step(
    State(state): State<AppState>,
    Path(step): Path<i64>,
    Json(request): Json<StepRequest>,
) -> Response {
    let Some(info) = i64_step(step) else {
        return error_json(
            StatusCode::BAD_REQUEST,
            format!("Step {step} is outside the valid range 1-17"),
        )
        .into_response();
    };

    let profile = request.profile.unwrap_or_default();
    let funnel = FunnelStage::classify(profile.budget.as_deref());

    match state
        .generator
        .generate(&profile, funnel, info.number, info.content_type)
        .await
    {
        Ok(content) => Json(serde_json::json!({
            "step": info.number,
            "objective": info.objective,
            "contentType": info.content_type,
            "content": content,
            "funnelStage": funnel,
        }))
        .into_response(),
        Err(e) => {
            tracing::warn!(step = info.number, error = %e, "Step generation failed");
            error_json(StatusCode::BAD_GATEWAY, "Content generation failed").into_response()
        }
    }
}

/// GET /api/content/preview/{campaign_id}
///
/// Regenerates the campaign's email sequence from the contact's current
/// profile for review. Nothing is persisted; approval stores the sequence.
async fn preview_sequence(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> Response {
    let campaign = match state.db.get_campaign(campaign_id).await {
        Ok(Some(campaign)) => campaign,
        Ok(None) => {
            return error_json(
                StatusCode::NOT_FOUND,
                format!("campaign {campaign_id} not found"),
            )
            .into_response();
        }
        Err(e) => return db_error(e).into_response(),
    };
    let contact = match state.db.get_contact(campaign.contact_id).await {
        Ok(Some(contact)) => contact,
        Ok(None) => {
            return error_json(
                StatusCode::NOT_FOUND,
                format!("contact {} not found", campaign.contact_id),
            )
            .into_response();
        }
        Err(e) => return db_error(e).into_response(),
    };

    let pace = state.pace_override.unwrap_or(SEQUENCE_PACE);
    let emails =
        sequence::build_sequence(&state.generator, &contact.profile, campaign.funnel, pace).await;

    Json(serde_json::json!({
        "campaignId": campaign.id,
        "funnelStage": campaign.funnel,
        "emails": emails,
    }))
    .into_response()
}

/// POST /api/content/approve/{campaign_id}
///
/// Approves the campaign's content: activates it and schedules the first
/// send for now.
async fn approve_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> Response {
    let mut campaign = match state.db.get_campaign(campaign_id).await {
        Ok(Some(campaign)) => campaign,
        Ok(None) => {
            return error_json(
                StatusCode::NOT_FOUND,
                format!("campaign {campaign_id} not found"),
            )
            .into_response();
        }
        Err(e) => return db_error(e).into_response(),
    };

    campaign.status = CampaignStatus::Active;
    campaign.next_email_at = Some(Utc::now());
    if let Err(e) = state.db.update_campaign(&campaign).await {
        return db_error(e).into_response();
    }

    info!(campaign_id = %campaign.id, "Campaign approved");
    Json(serde_json::json!({
        "campaignId": campaign.id,
        "status": campaign.status,
        "nextEmailAt": campaign.next_email_at,
    }))
    .into_response()
}

fn i64_step(step: i64) -> Option<&'static steps::StepInfo> {
    if steps::is_valid_step(step) {
        steps::step(step as u8)
    } else {
        None
    }
}
