//! Email campaign endpoints: sequence dispatch, delivery status, and
//! open/click tracking.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::crm::model::{Campaign, CampaignStatus};
use crate::mailer::Mailer;

use super::{db_error, error_json, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/emails/send-sequence", post(send_sequence))
        .route("/api/emails/status/{campaign_id}", get(sequence_status))
        .route("/api/emails/test", post(send_test))
        .route("/api/emails/open/{campaign_id}/{n}", post(track_open))
        .route("/api/emails/click/{campaign_id}/{n}", post(track_click))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendSequenceRequest {
    campaign_id: Uuid,
}

/// POST /api/emails/send-sequence
///
/// Dispatches every unsent email of the campaign's sequence. Without an SMTP
/// configuration the sends are simulated and only logged; either way the
/// emails are marked sent so the sequence does not repeat.
async fn send_sequence(
    State(state): State<AppState>,
    Json(request): Json<SendSequenceRequest>,
) -> Response {
    let mut campaign = match state.db.get_campaign(request.campaign_id).await {
        Ok(Some(campaign)) => campaign,
        Ok(None) => {
            return error_json(
                StatusCode::NOT_FOUND,
                format!("campaign {} not found", request.campaign_id),
            )
            .into_response();
        }
        Err(e) => return db_error(e).into_response(),
    };

    let recipient = match state.db.get_contact(campaign.contact_id).await {
        Ok(contact) => contact.and_then(|c| c.profile.email),
        Err(e) => return db_error(e).into_response(),
    };

    let now = Utc::now();
    let mut sent = 0usize;
    for email in campaign
        .email_sequence
        .iter_mut()
        .filter(|e| e.sent_at.is_none())
    {
        match (&state.mailer, &recipient) {
            (Some(mailer), Some(to)) => {
                if let Err(e) =
                    deliver(mailer.clone(), to.clone(), email.subject.clone(), email.content.clone())
                        .await
                {
                    warn!(
                        campaign_id = %campaign.id,
                        email_number = email.email_number,
                        error = %e,
                        "Email delivery failed, marking sent anyway"
                    );
                }
            }
            _ => {
                info!(
                    campaign_id = %campaign.id,
                    email_number = email.email_number,
                    subject = %email.subject,
                    "Simulated email send"
                );
            }
        }
        email.sent_at = Some(now);
        sent += 1;
    }

    campaign.status = CampaignStatus::Active;
    if let Err(e) = state.db.update_campaign(&campaign).await {
        return db_error(e).into_response();
    }

    Json(serde_json::json!({
        "campaignId": campaign.id,
        "sent": sent,
        "total": campaign.email_sequence.len(),
        "simulated": state.mailer.is_none() || recipient.is_none(),
    }))
    .into_response()
}

/// Run the blocking SMTP send off the async runtime.
async fn deliver(
    mailer: Arc<Mailer>,
    to: String,
    subject: String,
    body: String,
) -> Result<(), crate::error::MailError> {
    tokio::task::spawn_blocking(move || mailer.send(&to, &subject, &body))
        .await
        .map_err(|e| crate::error::MailError::SendFailed(format!("send task failed: {e}")))?
}

/// GET /api/emails/status/{campaign_id}
async fn sequence_status(State(state): State<AppState>, Path(campaign_id): Path<Uuid>) -> Response {
    match state.db.get_campaign(campaign_id).await {
        Ok(Some(campaign)) => {
            let emails: Vec<serde_json::Value> = campaign
                .email_sequence
                .iter()
                .map(|e| {
                    serde_json::json!({
                        "emailNumber": e.email_number,
                        "subject": e.subject,
                        "sentAt": e.sent_at,
                        "opened": e.opened,
                        "clicked": e.clicked,
                    })
                })
                .collect();
            Json(serde_json::json!({
                "campaignId": campaign.id,
                "status": campaign.status,
                "funnelStage": campaign.funnel,
                "emails": emails,
            }))
            .into_response()
        }
        Ok(None) => error_json(
            StatusCode::NOT_FOUND,
            format!("campaign {campaign_id} not found"),
        )
        .into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct TestEmailRequest {
    to: String,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

/// POST /api/emails/test
///
/// Sends a single test email to verify the SMTP configuration.
async fn send_test(State(state): State<AppState>, Json(request): Json<TestEmailRequest>) -> Response {
    let subject = request.subject.unwrap_or_else(|| "Email de prueba".to_string());
    let body = request
        .body
        .unwrap_or_else(|| "Este es un email de prueba del sistema de campañas.".to_string());

    match &state.mailer {
        Some(mailer) => match deliver(mailer.clone(), request.to.clone(), subject, body).await {
            Ok(()) => Json(serde_json::json!({ "sent": true, "simulated": false })).into_response(),
            Err(e) => {
                error_json(StatusCode::BAD_GATEWAY, format!("Send failed: {e}")).into_response()
            }
        },
        None => {
            info!(to = %request.to, "Simulated test email (SMTP not configured)");
            Json(serde_json::json!({ "sent": true, "simulated": true })).into_response()
        }
    }
}

/// POST /api/emails/open/{campaign_id}/{n}
async fn track_open(
    State(state): State<AppState>,
    Path((campaign_id, n)): Path<(Uuid, u32)>,
) -> Response {
    track(state, campaign_id, n, |email| email.opened = true).await
}

/// POST /api/emails/click/{campaign_id}/{n}
async fn track_click(
    State(state): State<AppState>,
    Path((campaign_id, n)): Path<(Uuid, u32)>,
) -> Response {
    track(state, campaign_id, n, |email| email.clicked = true).await
}

/// Mark one email of a campaign via the given mutation.
async fn track(
    state: AppState,
    campaign_id: Uuid,
    email_number: u32,
    apply: impl FnOnce(&mut crate::crm::model::SequenceEmail),
) -> Response {
    let mut campaign: Campaign = match state.db.get_campaign(campaign_id).await {
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

    let Some(email) = campaign
        .email_sequence
        .iter_mut()
        .find(|e| e.email_number == email_number)
    else {
        return error_json(
            StatusCode::NOT_FOUND,
            format!("email {email_number} not found in campaign {campaign_id}"),
        )
        .into_response();
    };
    apply(email);

    if let Err(e) = state.db.update_campaign(&campaign).await {
        return db_error(e).into_response();
    }
    Json(serde_json::json!({ "campaignId": campaign_id, "emailNumber": email_number }))
        .into_response()
}
