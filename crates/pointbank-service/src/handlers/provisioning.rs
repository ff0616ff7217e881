//! Provisioning handlers for accounts and events (service API key auth).
//!
//! These create records with their starting pool or award and soft-delete
//! them. They never change a balance or pool afterwards.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use pointbank_core::{
    AdminAccount, AdminId, Event, EventId, FacilitatorAccount, FacilitatorId, GrantPool,
    UserAccount, UserId,
};
use pointbank_store::Store;

use crate::auth::ServiceAuth;
use crate::error::ApiError;
use crate::handlers::{blocking, parse_id};
use crate::state::AppState;

/// Create administrator request.
#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    /// Display name.
    pub name: String,
    /// Starting grant pool.
    #[serde(default)]
    pub available_to_grant: i64,
}

/// Create an administrator.
pub async fn create_admin(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
    Json(body): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<AdminAccount>), ApiError> {
    let admin = AdminAccount::new(
        AdminId::generate(),
        body.name,
        GrantPool::new(body.available_to_grant)?,
    );

    let store = Arc::clone(&state.store);
    let record = admin.clone();
    blocking(move || store.insert_admin(&record)).await?;

    tracing::info!(
        service = %auth.service_name,
        admin_id = %admin.id,
        available_to_grant = admin.pool.available_to_grant,
        "Admin created"
    );

    Ok((StatusCode::CREATED, Json(admin)))
}

/// Create facilitator request.
#[derive(Debug, Deserialize)]
pub struct CreateFacilitatorRequest {
    /// The user account this facilitator acts for.
    pub user_id: String,
    /// Display name.
    pub name: String,
    /// Starting grant pool.
    #[serde(default)]
    pub available_to_grant: i64,
}

/// Create a facilitator linked to an existing user.
pub async fn create_facilitator(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
    Json(body): Json<CreateFacilitatorRequest>,
) -> Result<(StatusCode, Json<FacilitatorAccount>), ApiError> {
    let user_id: UserId = parse_id(&body.user_id, "user ID")?;
    let facilitator = FacilitatorAccount::new(
        FacilitatorId::generate(),
        user_id,
        body.name,
        GrantPool::new(body.available_to_grant)?,
    );

    let store = Arc::clone(&state.store);
    let record = facilitator.clone();
    blocking(move || store.insert_facilitator(&record)).await?;

    tracing::info!(
        service = %auth.service_name,
        facilitator_id = %facilitator.id,
        user_id = %user_id,
        available_to_grant = facilitator.pool.available_to_grant,
        "Facilitator created"
    );

    Ok((StatusCode::CREATED, Json(facilitator)))
}

/// Create user request.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Identifier printed in the user's QR code.
    pub scan_id: String,
    /// Display name.
    pub name: String,
}

/// Create a user with a zero balance.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserAccount>), ApiError> {
    if body.scan_id.trim().is_empty() {
        return Err(ApiError::BadRequest("scan_id must not be empty".into()));
    }
    let user = UserAccount::new(UserId::generate(), body.scan_id, body.name);

    let store = Arc::clone(&state.store);
    let record = user.clone();
    blocking(move || store.insert_user(&record)).await?;

    tracing::info!(service = %auth.service_name, user_id = %user.id, "User created");

    Ok((StatusCode::CREATED, Json(user)))
}

/// Create event request.
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    /// Title shown in ledger descriptions.
    pub title: String,
    /// Points awarded per attendance.
    pub point_amount: i64,
}

/// Create an event.
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
    Json(body): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let event = Event::new(EventId::generate(), body.title, body.point_amount)?;

    let store = Arc::clone(&state.store);
    let record = event.clone();
    blocking(move || store.insert_event(&record)).await?;

    tracing::info!(
        service = %auth.service_name,
        event_id = %event.id,
        point_amount = event.point_amount,
        "Event created"
    );

    Ok((StatusCode::CREATED, Json(event)))
}

/// Soft-delete a user. Their history is kept.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let user_id: UserId = parse_id(&user_id, "user ID")?;

    let store = Arc::clone(&state.store);
    blocking(move || store.delete_user(&user_id)).await?;

    tracing::info!(service = %auth.service_name, user_id = %user_id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Soft-delete an event. Later check-ins are rejected.
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
    Path(event_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let event_id: EventId = parse_id(&event_id, "event ID")?;

    let store = Arc::clone(&state.store);
    blocking(move || store.delete_event(&event_id)).await?;

    tracing::info!(service = %auth.service_name, event_id = %event_id, "Event deleted");

    Ok(StatusCode::NO_CONTENT)
}
