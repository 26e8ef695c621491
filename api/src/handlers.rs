use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use shared::{original_namespace, FormResponse, FormSubmission, OriginalSnapshot};
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    metrics,
    session::{clear_snapshots, load_snapshot, save_snapshot},
    session_cookie::SessionId,
    state::AppState,
    validation::{FormBody, FormSchema},
};

fn lookup_form(state: &AppState, entity: &str) -> ApiResult<Arc<FormSchema>> {
    state.forms.get(entity).ok_or_else(|| {
        tracing::debug!(form = entity, "unknown form requested");
        ApiError::form_not_found(entity)
    })
}

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let uptime = state.started_at.elapsed().as_secs();
    let now = chrono::Utc::now().to_rfc3339();
    let forms: Vec<&str> = state.forms.entities().collect();

    tracing::info!(uptime_secs = uptime, "health check passed");
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": now,
            "uptime_secs": uptime,
            "forms": forms
        })),
    )
}

/// GET /forms/:entity
///
/// Returns the saved values and records them as the original snapshot that
/// later submissions are compared against.
pub async fn show_form(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    session: SessionId,
) -> ApiResult<Response> {
    let schema = lookup_form(&state, &entity)?;
    let sessions = state.sessions.as_ref();

    let stored = sessions.get(&session.id, schema.entity()).await?;
    let values = schema.sanitize(&FormSubmission::from_value(stored.unwrap_or(Value::Null)));

    let snapshot = OriginalSnapshot::from_form(&values);
    if snapshot.is_empty() {
        sessions
            .delete(&session.id, &original_namespace(schema.entity()))
            .await?;
    } else {
        save_snapshot(sessions, &session.id, schema.entity(), &snapshot).await?;
    }

    tracing::info!(form = %entity, "form displayed");
    let body = FormResponse {
        form: entity,
        values: values.to_value(),
        errors: None,
    };
    Ok(session.attach(Json(body).into_response()))
}

/// POST /forms/:entity
///
/// Validation failures answer 400 with the values echoed back and the error
/// report. Accepted values are saved and every original snapshot is dropped.
pub async fn submit_form(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    session: SessionId,
    FormBody(submission): FormBody,
) -> ApiResult<Response> {
    let schema = lookup_form(&state, &entity)?;
    let sessions = state.sessions.as_ref();

    let original = load_snapshot(sessions, &session.id, schema.entity()).await?;
    let outcome = schema.process(&submission, original.as_ref(), state.translator.as_ref());
    metrics::observe_submission(schema.entity(), &outcome.failures);

    if !outcome.is_valid() {
        tracing::info!(
            form = %entity,
            failures = outcome.failures.len(),
            "submission rejected"
        );
        let body = FormResponse {
            form: entity,
            values: outcome.values.to_value(),
            errors: Some(outcome.report()),
        };
        return Ok(session.attach((StatusCode::BAD_REQUEST, Json(body)).into_response()));
    }

    sessions
        .set(&session.id, schema.entity(), outcome.stored_value())
        .await?;
    clear_snapshots(sessions, &session.id).await?;

    tracing::info!(form = %entity, "submission accepted");
    let body = FormResponse {
        form: entity,
        values: outcome.stored_value(),
        errors: None,
    };
    Ok(session.attach(Json(body).into_response()))
}

/// DELETE /forms/:entity
pub async fn reset_form(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    session: SessionId,
) -> ApiResult<Response> {
    let schema = lookup_form(&state, &entity)?;
    let sessions = state.sessions.as_ref();

    let removed = sessions.delete(&session.id, schema.entity()).await?;
    sessions
        .delete(&session.id, &original_namespace(schema.entity()))
        .await?;

    tracing::info!(form = %entity, removed, "form reset");
    Ok(session.attach(StatusCode::NO_CONTENT.into_response()))
}

pub async fn route_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({"error": "Route not found"})))
}
