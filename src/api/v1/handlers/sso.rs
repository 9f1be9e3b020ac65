/*
 * Responsibility
 * - POST /sso/decision
 * - Hands the identity to RoleResolver and maps the decision to the wire DTO
 */
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use chrono::Utc;

use crate::{
    api::v1::dto::sso::{DecisionResponse, IdentityRecordRequest},
    error::AppError,
    state::AppState,
};

pub async fn decide(
    State(state): State<AppState>,
    payload: Result<Json<IdentityRecordRequest>, JsonRejection>,
) -> Result<Json<DecisionResponse>, AppError> {
    let Json(req) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection, "rejected identity record");
        AppError::bad_request("INVALID_IDENTITY_RECORD", "invalid identity record")
    })?;

    let decision = state.resolver.resolve(req.into()).await?;

    tracing::info!(
        user_id = %decision.user_id,
        role = %decision.role,
        existing_user = decision.existing_user,
        "sso decision issued"
    );

    Ok(Json(DecisionResponse::from_decision(decision, Utc::now())))
}
