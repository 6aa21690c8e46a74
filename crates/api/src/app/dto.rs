use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use petadopt_core::{ListingId, ListingUpdate, Sex, Username};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `/signup` and `/login`.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    pub name: String,
    pub pet_type: String,
    #[serde(default)]
    pub breed: String,
    pub sex: Sex,
    pub date_of_birth: NaiveDate,
}

/// Partial update; unknown fields (including `listed_by`) are rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateListingRequest {
    pub name: Option<String>,
    pub pet_type: Option<String>,
    pub breed: Option<String>,
    pub sex: Option<Sex>,
    pub date_of_birth: Option<NaiveDate>,
}

impl From<UpdateListingRequest> for ListingUpdate {
    fn from(req: UpdateListingRequest) -> Self {
        ListingUpdate {
            name: req.name,
            pet_type: req.pet_type,
            breed: req.breed,
            sex: req.sex,
            date_of_birth: req.date_of_birth,
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub username: Username,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: ListingId,
}
