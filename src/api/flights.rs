use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::validation::{
    validate_flight_fields, validate_flight_pk, validate_limit, validate_lookup_params,
};
use super::observability::ServedFlight;
use super::{ApiError, ApiResponse, AppState, FlightDto};

const DEFAULT_LIST_LIMIT: u64 = 100;

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub airline: Option<String>,
    pub flight_number: Option<String>,
    pub departure_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFlightRequest {
    pub airline_code: String,
    pub flight_number: String,
    pub departure_date: String,
    pub extra_data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFlightRequest {
    pub extra_data: serde_json::Value,
}

/// `GET /api/flight-service/flights?airline=&flight_number=&departure_date=`
///
/// Resolves the flight from the database, or from the provider on first
/// sight, and serves it through the record cache.
pub async fn lookup_flight(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LookupQuery>,
) -> Result<(Extension<ServedFlight>, Json<ApiResponse<FlightDto>>), ApiError> {
    let key = validate_lookup_params(
        params.airline.as_deref(),
        params.flight_number.as_deref(),
        params.departure_date.as_deref(),
    )?;

    let record = state.flights().lookup(&key).await?;
    Ok((
        Extension(ServedFlight(record.pk)),
        Json(ApiResponse::success(record.into())),
    ))
}

/// `GET /api/flight-service/flights/{pk}`
pub async fn get_flight(
    State(state): State<Arc<AppState>>,
    Path(pk): Path<i32>,
) -> Result<(Extension<ServedFlight>, Json<ApiResponse<FlightDto>>), ApiError> {
    let pk = validate_flight_pk(pk)?;
    let record = state.flights().retrieve(pk).await?;
    Ok((
        Extension(ServedFlight(pk)),
        Json(ApiResponse::success(record.into())),
    ))
}

/// `GET /api/flight-service/flights/all`
///
/// Read straight from the database, most recently updated first.
pub async fn list_flights(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<FlightDto>>>, ApiError> {
    let limit = validate_limit(params.limit.unwrap_or(DEFAULT_LIST_LIMIT))?;
    let records = state.flights().list(limit).await?;
    Ok(Json(ApiResponse::success(
        records.into_iter().map(FlightDto::from).collect(),
    )))
}

/// `POST /api/flight-service/flights`
pub async fn create_flight(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateFlightRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FlightDto>>), ApiError> {
    let key = validate_flight_fields(
        &request.airline_code,
        &request.flight_number,
        &request.departure_date,
    )?;
    let extra_data = request
        .extra_data
        .unwrap_or_else(|| serde_json::json!({}));

    let record = state.flights().create(key, extra_data).await?;
    info!(pk = record.pk, "Created flight via API");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(record.into())),
    ))
}

/// `PUT /api/flight-service/flights/{pk}`
pub async fn update_flight(
    State(state): State<Arc<AppState>>,
    Path(pk): Path<i32>,
    Json(request): Json<UpdateFlightRequest>,
) -> Result<Json<ApiResponse<FlightDto>>, ApiError> {
    let pk = validate_flight_pk(pk)?;
    let record = state.flights().update(pk, request.extra_data).await?;
    Ok(Json(ApiResponse::success(record.into())))
}

/// `DELETE /api/flight-service/flights/{pk}`
pub async fn delete_flight(
    State(state): State<Arc<AppState>>,
    Path(pk): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let pk = validate_flight_pk(pk)?;
    state.flights().delete(pk).await?;
    Ok(Json(ApiResponse::success(())))
}
