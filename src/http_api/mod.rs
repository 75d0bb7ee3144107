use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    AuthError, AuthProvider, ExportError, Hatim, HatimId, HatimPatch, HatimStats, HatimStore,
    SessionUser, StoreError, calculate_reading_progress, calculate_stats,
    export::{self, PdfExport},
    grid::{self, ScheduledDay},
};

#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<HatimStore>>,
    auth: Arc<dyn AuthProvider>,
}

impl AppState {
    pub fn new(store: HatimStore, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            auth,
        }
    }

    pub fn with_shared(store: Arc<RwLock<HatimStore>>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { store, auth }
    }

    fn store(&self) -> Arc<RwLock<HatimStore>> {
        self.store.clone()
    }

    /// The in-memory copy when loaded, otherwise the owner's copy.
    fn find_hatim(&self, id: &HatimId) -> Option<Hatim> {
        let guard = self.store.read();
        guard.get(id).cloned().or_else(|| guard.load(id))
    }

    fn require_hatim(&self, id: &HatimId) -> Result<Hatim, ApiError> {
        self.find_hatim(id)
            .ok_or_else(|| ApiError::not_found(format!("hatim {id} not found")))
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Unauthorized(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(err) => ApiError::Invalid(err.to_string()),
            StoreError::NotFound(id) => ApiError::not_found(format!("hatim {id} not found")),
            StoreError::Persistence(err) => ApiError::internal(err.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(value: ExportError) -> Self {
        match value {
            ExportError::Validation(err) => ApiError::Invalid(err.to_string()),
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::InvalidCredentials => ApiError::Unauthorized(value.to_string()),
            AuthError::EmailTaken(_)
            | AuthError::InvalidEmail(_)
            | AuthError::WeakPassword { .. } => ApiError::Invalid(value.to_string()),
            AuthError::Persistence(err) => ApiError::internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, "unauthorized", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct CredentialsPayload {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct CreateHatimPayload {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: HatimStats,
    pub reading_progress: f64,
}

#[derive(Debug, Serialize)]
pub struct TrackedParticipant {
    pub index: usize,
    pub full_name: String,
    pub pages: u32,
    pub days: Vec<ScheduledDay>,
}

/// Participant self-service view of a hatim.
#[derive(Debug, Serialize)]
pub struct TrackingView {
    pub id: HatimId,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub participants: Vec<TrackedParticipant>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckedDayResponse {
    pub checked: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/signup", post(sign_up))
        .route("/auth/signin", post(sign_in))
        .route("/auth/signout", post(sign_out))
        .route("/auth/me", get(current_user))
        .route("/hatims", get(list_hatims).post(create_hatim))
        .route(
            "/hatims/:id",
            get(get_hatim).patch(update_hatim).delete(delete_hatim),
        )
        .route("/hatims/:id/stats", get(hatim_stats))
        .route("/hatims/:id/export/spreadsheet", get(export_spreadsheet))
        .route("/hatims/:id/export/pdf", get(export_schedule_pdf))
        .route("/hatims/:id/export/pdf/:index", get(export_personal_pdf))
        .route("/takip/:id", get(tracking_view))
        .route(
            "/takip/:id/participants/:index/days/:date",
            post(toggle_checked_day),
        )
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsPayload>,
) -> Result<(StatusCode, Json<SessionUser>), ApiError> {
    let user = state.auth.sign_up(&payload.email, &payload.password)?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsPayload>,
) -> Result<Json<SessionUser>, ApiError> {
    let user = state.auth.sign_in(&payload.email, &payload.password)?;
    let store = state.store();
    {
        let mut guard = store.write();
        guard.begin_session(Some(user.clone()));
        guard.load_all();
    }
    Ok(Json(user))
}

async fn sign_out(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.auth.sign_out()?;
    let store = state.store();
    {
        let mut guard = store.write();
        guard.begin_session(None);
        guard.load_all();
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn current_user(State(state): State<AppState>) -> Json<Option<SessionUser>> {
    Json(state.auth.current_user())
}

async fn list_hatims(State(state): State<AppState>) -> Json<Vec<Hatim>> {
    let store = state.store();
    let hatims = {
        let mut guard = store.write();
        guard.load_all().to_vec()
    };
    Json(hatims)
}

async fn create_hatim(
    State(state): State<AppState>,
    payload: Option<Json<CreateHatimPayload>>,
) -> Result<(StatusCode, Json<Hatim>), ApiError> {
    let name = payload.map(|Json(p)| p.name).unwrap_or_default();
    let store = state.store();
    let created = {
        let mut guard = store.write();
        let id = guard.create(&name)?;
        guard
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::internal("hatim not found after creation"))?
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_hatim(
    State(state): State<AppState>,
    Path(id): Path<HatimId>,
) -> Result<Json<Hatim>, ApiError> {
    state.require_hatim(&id).map(Json)
}

async fn update_hatim(
    State(state): State<AppState>,
    Path(id): Path<HatimId>,
    Json(patch): Json<HatimPatch>,
) -> Result<Json<Hatim>, ApiError> {
    let mut current = state.require_hatim(&id)?;
    let store = state.store();
    {
        let mut guard = store.write();
        guard.update(&id, patch.clone())?;
    }
    current.apply(&patch);
    Ok(Json(current))
}

async fn delete_hatim(
    State(state): State<AppState>,
    Path(id): Path<HatimId>,
) -> Result<StatusCode, ApiError> {
    let store = state.store();
    {
        let mut guard = store.write();
        guard.delete(&id)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn hatim_stats(
    State(state): State<AppState>,
    Path(id): Path<HatimId>,
) -> Result<Json<StatsResponse>, ApiError> {
    let hatim = state.require_hatim(&id)?;
    Ok(Json(StatsResponse {
        stats: calculate_stats(&hatim.participants),
        reading_progress: calculate_reading_progress(
            &hatim.participants,
            hatim.start_date,
            hatim.end_date,
        ),
    }))
}

async fn export_spreadsheet(
    State(state): State<AppState>,
    Path(id): Path<HatimId>,
) -> Result<Response, ApiError> {
    let hatim = state.require_hatim(&id)?;
    let document = export::build_spreadsheet(&hatim)?;
    let bytes = document.to_csv_bytes()?;
    info!(hatim_id = %id, rows = document.rows.len(), "exported spreadsheet");
    let disposition = format!("attachment; filename=\"{}\"", document.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

async fn export_schedule_pdf(
    State(state): State<AppState>,
    Path(id): Path<HatimId>,
) -> Result<Json<PdfExport>, ApiError> {
    let hatim = state.require_hatim(&id)?;
    Ok(Json(export::build_schedule_pdf(&hatim)?))
}

async fn export_personal_pdf(
    State(state): State<AppState>,
    Path((id, index)): Path<(HatimId, usize)>,
) -> Result<Json<PdfExport>, ApiError> {
    let hatim = state.require_hatim(&id)?;
    Ok(Json(export::build_personal_pdf(&hatim, index)?))
}

async fn tracking_view(
    State(state): State<AppState>,
    Path(id): Path<HatimId>,
) -> Result<Json<TrackingView>, ApiError> {
    let hatim = state.require_hatim(&id)?;
    let participants = hatim
        .participants
        .iter()
        .enumerate()
        .map(|(index, participant)| TrackedParticipant {
            index,
            full_name: participant.full_name.clone(),
            pages: participant.pages,
            // without a date range there are no days to track yet
            days: grid::participant_schedule(&hatim, index).unwrap_or_default(),
        })
        .collect();
    Ok(Json(TrackingView {
        id: hatim.id,
        name: hatim.name,
        start_date: hatim.start_date,
        end_date: hatim.end_date,
        participants,
    }))
}

async fn toggle_checked_day(
    State(state): State<AppState>,
    Path((id, index, date)): Path<(HatimId, usize, NaiveDate)>,
) -> Result<Json<CheckedDayResponse>, ApiError> {
    let store = state.store();
    let checked = {
        let mut guard = store.write();
        guard.toggle_checked_day(&id, index, date).inspect_err(|err| {
            warn!(hatim_id = %id, index, %date, error = %err, "checked day toggle rejected");
        })?
    };
    Ok(Json(CheckedDayResponse { checked }))
}
