//! # API REST
//!
//! REST API implementation for rxscan.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS)
//!
//! Prescription problems are reported as warnings in a normal `200` response, including a body
//! that is valid JSON but not an object. Only a body that is not JSON at all is rejected.

#![warn(rust_2018_idioms)]

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    CanonicalRes, DoctorsNotes, HealthRes, HealthService, MedicineDetails, MedicineInfoRes,
    OnExamination, PatientDetails, PrescriptionRecord, Severity, TreatmentItem, Warning,
    WarningCode, WarningRules, WarningReport,
};
use rxscan_core::{canonical_lines, medicine_info, resolve_rules, MedicineInfo, WarningEngine};

/// Application state shared across REST API handlers
///
/// Holds the warning engine built from the rules resolved at startup.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<WarningEngine>,
}

impl AppState {
    pub fn new(rules: WarningRules) -> Self {
        Self {
            engine: Arc::new(WarningEngine::new(rules)),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, analyze_warnings, canonical, medicines, rules),
    components(schemas(
        HealthRes,
        WarningReport,
        Warning,
        WarningCode,
        Severity,
        CanonicalRes,
        MedicineInfoRes,
        MedicineInfo,
        MedicineDetails,
        PrescriptionRecord,
        PatientDetails,
        DoctorsNotes,
        OnExamination,
        TreatmentItem,
        WarningRules,
    ))
)]
pub struct ApiDoc;

/// Resolve warning rules from the process environment.
///
/// Reads `RXSCAN_RULES_FILE`; when unset the built-in rules are used.
///
/// # Errors
/// Returns an error if the rules file cannot be read, parsed or validated.
pub fn rules_from_env() -> anyhow::Result<WarningRules> {
    let override_file = std::env::var(rxscan_core::RULES_FILE_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);
    Ok(resolve_rules(override_file)?)
}

/// Build the REST router with all routes, Swagger UI and CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/warnings", post(analyze_warnings))
        .route("/api/canonical", post(canonical))
        .route("/api/medicine-info", post(medicines))
        .route("/api/rules", get(rules))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve the REST API until the server stops.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails while running.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/api/warnings",
    request_body = PrescriptionRecord,
    responses(
        (status = 200, description = "Warnings for the prescription, most severe first", body = WarningReport),
        (status = 400, description = "Body is not valid JSON")
    )
)]
/// Run the warning engine over a prescription
///
/// Any JSON body is accepted. A body that is not an object yields a single `invalid_payload`
/// warning rather than an error status.
#[axum::debug_handler]
async fn analyze_warnings(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Json<WarningReport> {
    let report = WarningReport::from(state.engine.analyze(&payload));
    tracing::info!("analysed prescription: {} warnings", report.count);
    Json(report)
}

#[utoipa::path(
    post,
    path = "/api/canonical",
    request_body = PrescriptionRecord,
    responses(
        (status = 200, description = "One line per treatment item", body = CanonicalRes)
    )
)]
/// Render each treatment item as a single canonical line
#[axum::debug_handler]
async fn canonical(Json(payload): Json<Value>) -> Json<CanonicalRes> {
    let canonical = PrescriptionRecord::from_json(&payload)
        .map(|record| canonical_lines(&record))
        .unwrap_or_default();
    Json(CanonicalRes { canonical })
}

#[utoipa::path(
    post,
    path = "/api/medicine-info",
    request_body = PrescriptionRecord,
    responses(
        (status = 200, description = "Explanation card per treatment item", body = MedicineInfoRes)
    )
)]
/// List each treatment item with its patient-facing explanation
#[axum::debug_handler]
async fn medicines(Json(payload): Json<Value>) -> Json<MedicineInfoRes> {
    let medicines = PrescriptionRecord::from_json(&payload)
        .map(|record| medicine_info(&record))
        .unwrap_or_default();
    Json(MedicineInfoRes { medicines })
}

#[utoipa::path(
    get,
    path = "/api/rules",
    responses(
        (status = 200, description = "Active warning rules", body = WarningRules)
    )
)]
/// Show the thresholds and keyword lists the engine is running with
#[axum::debug_handler]
async fn rules(State(state): State<AppState>) -> Json<WarningRules> {
    Json(state.engine.rules().clone())
}
