//! Ride handlers
//!
//! Posting and searching rides, reservations, and the driver's management
//! operations (update, delete, archive, cancel).

use axum::{extract::State, Json};
use carpool_core::Snowflake;
use carpool_service::dto::{
    CancelRideRequest, CancelRideResponse, DeleteRideResponse, DriverRidesQuery,
    RideDetailsRequest, RideResponse, SearchRidesQuery,
};
use carpool_service::RideService;

use crate::extractors::{AuthUser, OptionalAuthUser, SnowflakePath, ValidatedJson, ValidatedQuery};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Post a ride as the caller
///
/// POST /rides
pub async fn create_ride(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<RideDetailsRequest>,
) -> ApiResult<Created<Json<RideResponse>>> {
    let service = RideService::new(state.service_context());
    let ride = service.create(auth.user_id, request).await?;
    Ok(Created(Json(ride)))
}

/// Search upcoming rides; a signed-in caller does not see their own or booked rides
///
/// GET /rides?origin&destination
pub async fn search_rides(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    ValidatedQuery(query): ValidatedQuery<SearchRidesQuery>,
) -> ApiResult<Json<Vec<RideResponse>>> {
    let service = RideService::new(state.service_context());
    let rides = service.search(viewer.user_id(), &query).await?;
    Ok(Json(rides))
}

/// GET /rides/{ride_id}
pub async fn get_ride(
    State(state): State<AppState>,
    SnowflakePath(ride_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<RideResponse>> {
    let service = RideService::new(state.service_context());
    let ride = service.get(ride_id).await?;
    Ok(Json(ride))
}

/// Change route, time or seats while nobody has booked
///
/// PUT /rides/{ride_id}
pub async fn update_ride(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(ride_id): SnowflakePath<Snowflake>,
    ValidatedJson(request): ValidatedJson<RideDetailsRequest>,
) -> ApiResult<Json<RideResponse>> {
    let service = RideService::new(state.service_context());
    let ride = service.update(ride_id, auth.user_id, request).await?;
    Ok(Json(ride))
}

/// DELETE /rides/{ride_id}
pub async fn delete_ride(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(ride_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<DeleteRideResponse>> {
    let service = RideService::new(state.service_context());
    let response = service.delete(ride_id, auth.user_id).await?;
    Ok(Json(response))
}

/// POST /rides/{ride_id}/archive
pub async fn archive_ride(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(ride_id): SnowflakePath<Snowflake>,
) -> ApiResult<NoContent> {
    let service = RideService::new(state.service_context());
    service.archive(ride_id, auth.user_id).await?;
    Ok(NoContent)
}

/// Cancel with a reason; late cancellations cost the driver reputation
///
/// POST /rides/{ride_id}/cancel
pub async fn cancel_ride(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(ride_id): SnowflakePath<Snowflake>,
    ValidatedJson(request): ValidatedJson<CancelRideRequest>,
) -> ApiResult<Json<CancelRideResponse>> {
    let service = RideService::new(state.service_context());
    let response = service.cancel(ride_id, auth.user_id, request).await?;
    Ok(Json(response))
}

/// POST /rides/{ride_id}/reservation
pub async fn reserve_seat(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(ride_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<RideResponse>> {
    let service = RideService::new(state.service_context());
    let ride = service.reserve(ride_id, auth.user_id).await?;
    Ok(Json(ride))
}

/// DELETE /rides/{ride_id}/reservation
pub async fn cancel_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(ride_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<RideResponse>> {
    let service = RideService::new(state.service_context());
    let ride = service.cancel_reservation(ride_id, auth.user_id).await?;
    Ok(Json(ride))
}

/// Rides the caller drives; `history=true` for past and cancelled ones
///
/// GET /rides/driving
pub async fn driving_rides(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedQuery(query): ValidatedQuery<DriverRidesQuery>,
) -> ApiResult<Json<Vec<RideResponse>>> {
    let service = RideService::new(state.service_context());
    let rides = service.driving(auth.user_id, query.history).await?;
    Ok(Json(rides))
}

/// Rides the caller has a seat on
///
/// GET /rides/passenger
pub async fn passenger_rides(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<RideResponse>>> {
    let service = RideService::new(state.service_context());
    let rides = service.passenger(auth.user_id).await?;
    Ok(Json(rides))
}
