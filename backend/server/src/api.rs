//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use fund_me::{
    Address, Clock, DonationReceipt, Error as LedgerError, FundMe, ParseAddressError, Project,
    ProjectMetadata, ProjectStatus, RecordStore,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub struct ApiState<S, C> {
    pub ledger: FundMe<S, C>,
}

/// Build the router over a ledger backed by any store and clock.
pub fn router<S, C>(state: Arc<ApiState<S, C>>) -> Router
where
    S: RecordStore + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/program", get(program::<S, C>))
        .route("/projects", post(create_project::<S, C>))
        .route("/projects/:address", get(get_project::<S, C>))
        .route("/projects/:address/donations", post(donate::<S, C>))
        .route("/receipts/:address", get(get_receipt::<S, C>))
        .route("/addresses/project", get(derive_project_address::<S, C>))
        .route("/addresses/receipt", get(derive_receipt_address::<S, C>))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateProjectRequest {
    pub owner: Address,
    pub project_id: String,
    pub metadata: ProjectMetadata,
    pub target_amount: u64,
    pub end_time: i64,
}

#[derive(Deserialize)]
pub struct DonateRequest {
    pub user: Address,
    pub amount: u64,
    pub timestamp: i64,
}

#[derive(Deserialize)]
pub struct ProjectAddressQuery {
    pub owner: String,
    pub project_id: String,
}

#[derive(Deserialize)]
pub struct ReceiptAddressQuery {
    pub user: String,
    pub project: String,
    pub timestamp: i64,
}

#[derive(Serialize)]
pub struct ProjectResponse {
    pub address: Address,
    pub status: ProjectStatus,
    pub is_open: bool,
    #[serde(flatten)]
    pub project: Project,
}

#[derive(Serialize)]
pub struct ReceiptResponse {
    pub address: Address,
    #[serde(flatten)]
    pub receipt: DonationReceipt,
}

#[derive(Serialize)]
pub struct DonationResponse {
    pub receipt: ReceiptResponse,
    pub project: ProjectResponse,
}

#[derive(Serialize)]
pub struct DerivedAddressResponse {
    pub address: Address,
    pub bump: u8,
}

#[derive(Serialize)]
pub struct ProgramResponse {
    pub program_id: Address,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

// ─────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────

pub enum ApiError {
    InvalidAddress(ParseAddressError),
    Ledger(LedgerError),
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        Self::Ledger(e)
    }
}

impl From<ParseAddressError> for ApiError {
    fn from(e: ParseAddressError) -> Self {
        Self::InvalidAddress(e)
    }
}

fn ledger_status(e: &LedgerError) -> StatusCode {
    match e {
        LedgerError::Validation(_) | LedgerError::InvalidSeeds => StatusCode::BAD_REQUEST,
        LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::AlreadyExists(_) | LedgerError::DuplicateDonation(_) => StatusCode::CONFLICT,
        LedgerError::ProjectExpired { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        LedgerError::ArithmeticOverflow
        | LedgerError::AddressMismatch(_)
        | LedgerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::InvalidAddress(e) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "invalid_address",
                    message: e.to_string(),
                },
            ),
            Self::Ledger(e) => (
                ledger_status(&e),
                ErrorResponse {
                    error: e.code(),
                    message: e.to_string(),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

fn project_view<S: RecordStore, C: Clock>(
    ledger: &FundMe<S, C>,
    address: Address,
    project: Project,
) -> ProjectResponse {
    let now = ledger.clock().now();
    ProjectResponse {
        address,
        status: project.status(now),
        is_open: project.is_open(now),
        project,
    }
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /program`
pub async fn program<S: RecordStore, C: Clock>(
    State(state): State<Arc<ApiState<S, C>>>,
) -> impl IntoResponse {
    Json(ProgramResponse {
        program_id: *state.ledger.program_id(),
    })
}

/// `POST /projects`
pub async fn create_project<S: RecordStore, C: Clock>(
    State(state): State<Arc<ApiState<S, C>>>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<impl IntoResponse> {
    let ledger = &state.ledger;
    let project = ledger
        .init_project(
            req.owner,
            &req.project_id,
            req.metadata,
            req.target_amount,
            req.end_time,
        )
        .await?;
    let address = project.address(ledger.program_id())?;
    Ok((
        StatusCode::CREATED,
        Json(project_view(ledger, address, project)),
    ))
}

/// `GET /projects/:address`
pub async fn get_project<S: RecordStore, C: Clock>(
    State(state): State<Arc<ApiState<S, C>>>,
    Path(address): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let address: Address = address.parse()?;
    let project = state.ledger.get_project(&address).await?;
    Ok(Json(project_view(&state.ledger, address, project)))
}

/// `POST /projects/:address/donations`
///
/// Returns the new receipt together with the project as read right after
/// the donation committed.
pub async fn donate<S: RecordStore, C: Clock>(
    State(state): State<Arc<ApiState<S, C>>>,
    Path(address): Path<String>,
    Json(req): Json<DonateRequest>,
) -> ApiResult<impl IntoResponse> {
    let ledger = &state.ledger;
    let project_address: Address = address.parse()?;

    let receipt = ledger
        .donate(req.user, project_address, req.amount, req.timestamp)
        .await?;
    let receipt_address = receipt.address(ledger.program_id())?;
    let project = ledger.get_project(&project_address).await?;

    Ok((
        StatusCode::CREATED,
        Json(DonationResponse {
            receipt: ReceiptResponse {
                address: receipt_address,
                receipt,
            },
            project: project_view(ledger, project_address, project),
        }),
    ))
}

/// `GET /receipts/:address`
pub async fn get_receipt<S: RecordStore, C: Clock>(
    State(state): State<Arc<ApiState<S, C>>>,
    Path(address): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let address: Address = address.parse()?;
    let receipt = state.ledger.get_receipt(&address).await?;
    Ok(Json(ReceiptResponse { address, receipt }))
}

/// `GET /addresses/project?owner=&project_id=`
pub async fn derive_project_address<S: RecordStore, C: Clock>(
    State(state): State<Arc<ApiState<S, C>>>,
    Query(query): Query<ProjectAddressQuery>,
) -> ApiResult<impl IntoResponse> {
    let owner: Address = query.owner.parse()?;
    let (address, bump) = state.ledger.project_address(&owner, &query.project_id)?;
    Ok(Json(DerivedAddressResponse { address, bump }))
}

/// `GET /addresses/receipt?user=&project=&timestamp=`
pub async fn derive_receipt_address<S: RecordStore, C: Clock>(
    State(state): State<Arc<ApiState<S, C>>>,
    Query(query): Query<ReceiptAddressQuery>,
) -> ApiResult<impl IntoResponse> {
    let user: Address = query.user.parse()?;
    let project: Address = query.project.parse()?;
    let (address, bump) = state
        .ledger
        .receipt_address(&user, &project, query.timestamp)?;
    Ok(Json(DerivedAddressResponse { address, bump }))
}
