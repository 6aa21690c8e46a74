use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use chrono::Utc;

use petadopt_core::{Listing, ListingId, ListingUpdate, NewListing, Username};
use petadopt_infra::StoreError;

use crate::app::AppState;
use crate::app::dto::{CreateListingRequest, DeletedResponse, UpdateListingRequest};
use crate::app::errors::ApiError;
use crate::authz::authorize_listing_access;
use crate::context::PrincipalContext;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_listings).post(create_listing))
        .route(
            "/:id",
            get(get_listing).patch(update_listing).delete(delete_listing),
        )
}

fn parse_id(raw: &str) -> Result<ListingId, ApiError> {
    Ok(raw.parse::<ListingId>()?)
}

pub async fn list_listings(State(state): State<AppState>) -> Result<Json<Vec<Listing>>, ApiError> {
    Ok(Json(state.store.get_listings().await?))
}

pub async fn list_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<Listing>>, ApiError> {
    let username = Username::parse(&username)?;
    Ok(Json(state.store.get_listings_by_username(&username).await?))
}

pub async fn create_listing(
    State(state): State<AppState>,
    principal: PrincipalContext,
    body: Result<Json<CreateListingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Listing>), ApiError> {
    let Json(body) = body?;
    let today = Utc::now().date_naive();

    let new = NewListing::new(
        principal.username().clone(),
        &body.name,
        &body.pet_type,
        &body.breed,
        body.sex,
        body.date_of_birth,
        today,
    )?;

    // A well-signed token whose user no longer exists.
    let listing = state.store.create_listing(new).await.map_err(|e| match e {
        StoreError::NotFound(_) => ApiError::invalid_token(),
        other => other.into(),
    })?;

    tracing::info!(listing = %listing.id, user = %listing.listed_by, "listing created");
    Ok((StatusCode::CREATED, Json(listing)))
}

pub async fn get_listing(
    State(state): State<AppState>,
    principal: PrincipalContext,
    Path(id): Path<String>,
) -> Result<Json<Listing>, ApiError> {
    let id = parse_id(&id)?;
    authorize_listing_access(&state, &principal, id).await?;
    Ok(Json(state.store.get_listing_by_id(id).await?))
}

pub async fn update_listing(
    State(state): State<AppState>,
    principal: PrincipalContext,
    Path(id): Path<String>,
    body: Result<Json<UpdateListingRequest>, JsonRejection>,
) -> Result<Json<Listing>, ApiError> {
    let id = parse_id(&id)?;
    authorize_listing_access(&state, &principal, id).await?;

    let Json(body) = body?;
    let update = ListingUpdate::from(body).validated(Utc::now().date_naive())?;

    let listing = state.store.update_listing(id, update).await?;
    tracing::info!(listing = %listing.id, "listing updated");
    Ok(Json(listing))
}

pub async fn delete_listing(
    State(state): State<AppState>,
    principal: PrincipalContext,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id = parse_id(&id)?;
    authorize_listing_access(&state, &principal, id).await?;

    state.store.delete_listing_by_id(id).await?;
    tracing::info!(listing = %id, "listing deleted");
    Ok(Json(DeletedResponse { deleted: id }))
}
