//! Ownership gate for listing mutations and reads by id.

use petadopt_core::ListingId;

use crate::app::errors::ApiError;
use crate::app::AppState;
use crate::context::PrincipalContext;

/// Allow the call only when the principal created the listing.
///
/// A missing listing is reported as 404 before ownership is considered.
pub async fn authorize_listing_access(
    state: &AppState,
    principal: &PrincipalContext,
    id: ListingId,
) -> Result<(), ApiError> {
    let owns = state.store.check_ownership(principal.username(), id).await?;
    if !owns {
        tracing::debug!(user = %principal.username(), listing = %id, "ownership check failed");
        return Err(ApiError::Forbidden(petadopt_core::DomainError::Forbidden.to_string()));
    }
    Ok(())
}
