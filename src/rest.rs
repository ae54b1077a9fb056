use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::db::BankStore;
use crate::domain::{is_headquarter_code, BankRecord};
use crate::error::StoreError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: BankStore,
}

impl AppState {
    pub fn new(store: BankStore) -> Self {
        Self { store }
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/swift-codes", post(create_swift_code))
        .route(
            "/v1/swift-codes/:code",
            get(get_swift_code).delete(delete_swift_code),
        )
        .route("/v1/swift-codes/country/:iso2", get(get_country_swift_codes))
        .with_state(state)
}

/// A record plus, for headquarters only, its nested branches. The branches
/// key is absent entirely for a branch record, not an empty array.
#[derive(Serialize)]
struct SwiftCodeDetails {
    #[serde(flatten)]
    record: BankRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    branches: Option<Vec<BankRecord>>,
}

/// Axum handler for GET /v1/swift-codes/:code
async fn get_swift_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    // Stored codes are upper-cased; reads compare exactly
    let code = code.to_uppercase();
    info!("GET /v1/swift-codes/{}", code);

    let record = match state.store.get_by_code(&code).await {
        Ok(record) => record,
        Err(StoreError::NotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "SWIFT code not found" })),
            )
                .into_response();
        }
        Err(err) => {
            tracing::error!("Error fetching swift code {}: {:?}", code, err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Error fetching SWIFT code" })),
            )
                .into_response();
        }
    };

    let branches = if record.is_headquarter {
        match state.store.branches_for(&record.swift_code).await {
            Ok(branches) => Some(branches),
            Err(err) => {
                tracing::error!("Error fetching branches for {}: {:?}", code, err);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Error fetching branches" })),
                )
                    .into_response();
            }
        }
    } else {
        None
    };

    (StatusCode::OK, Json(SwiftCodeDetails { record, branches })).into_response()
}

/// Axum handler for GET /v1/swift-codes/country/:iso2
async fn get_country_swift_codes(
    State(state): State<AppState>,
    Path(iso2): Path<String>,
) -> impl IntoResponse {
    let iso2 = iso2.to_uppercase();
    info!("GET /v1/swift-codes/country/{}", iso2);

    let banks = match state.store.get_by_country(&iso2).await {
        Ok(banks) => banks,
        Err(err) => {
            tracing::error!("Error querying country {}: {:?}", iso2, err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Database query error" })),
            )
                .into_response();
        }
    };

    if banks.is_empty() {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "No banks found for given country code" })),
        )
            .into_response();
    }

    // Country name as observed on the first matching row
    let country_name = banks[0].country_name.clone();

    (
        StatusCode::OK,
        Json(json!({
            "countryISO2": iso2,
            "countryName": country_name,
            "swiftCodes": banks,
        })),
    )
        .into_response()
}

/// Axum handler for POST /v1/swift-codes
async fn create_swift_code(
    State(state): State<AppState>,
    Json(mut record): Json<BankRecord>,
) -> impl IntoResponse {
    info!("POST /v1/swift-codes - code: {}", record.swift_code);

    // The code's suffix, not the body, decides the headquarter flag; country
    // fields and the code itself are upper-cased by the store on write.
    record.swift_code = record.swift_code.to_uppercase();
    record.is_headquarter = is_headquarter_code(&record.swift_code);

    match state.store.insert(&record).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "SWIFT code successfully added" })),
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Error inserting swift code {}: {:?}", record.swift_code, err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Failed to insert SWIFT code" })),
            )
                .into_response()
        }
    }
}

/// Axum handler for DELETE /v1/swift-codes/:code
async fn delete_swift_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    let code = code.to_uppercase();
    info!("DELETE /v1/swift-codes/{}", code);

    match state.store.delete(&code).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({ "message": "SWIFT code successfully deleted" })),
        )
            .into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "SWIFT code not found" })),
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Error deleting swift code {}: {:?}", code, err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Failed to delete SWIFT code" })),
            )
                .into_response()
        }
    }
}
