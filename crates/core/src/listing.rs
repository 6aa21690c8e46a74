//! Adoption listings.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, ListingId, Username};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_PET_TYPE_LEN: usize = 50;
pub const MAX_BREED_LEN: usize = 50;

/// Sex of the listed pet, stored and transmitted as `"m"` / `"f"`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "m",
            Sex::Female => "f",
        }
    }
}

impl core::fmt::Display for Sex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Sex {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(Sex::Male),
            "f" => Ok(Sex::Female),
            other => Err(DomainError::validation(format!("sex must be 'm' or 'f', got '{other}'"))),
        }
    }
}

/// A stored adoption listing.
///
/// # Invariants
/// - `listed_by` references an existing user and never changes after creation.
/// - `updated_at >= created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub listed_by: Username,
    pub name: String,
    pub pet_type: String,
    pub breed: String,
    pub sex: Sex,
    pub date_of_birth: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated listing that has not been stored yet (no id, no timestamps).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub listed_by: Username,
    pub name: String,
    pub pet_type: String,
    pub breed: String,
    pub sex: Sex,
    pub date_of_birth: NaiveDate,
}

impl NewListing {
    /// Validate listing fields. `today` bounds the date of birth.
    pub fn new(
        listed_by: Username,
        name: &str,
        pet_type: &str,
        breed: &str,
        sex: Sex,
        date_of_birth: NaiveDate,
        today: NaiveDate,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            listed_by,
            name: validate_required("name", name, MAX_NAME_LEN)?,
            pet_type: validate_required("pet_type", pet_type, MAX_PET_TYPE_LEN)?,
            breed: validate_optional("breed", breed, MAX_BREED_LEN)?,
            sex,
            date_of_birth: validate_dob(date_of_birth, today)?,
        })
    }
}

/// Partial update of a listing. `None` leaves the stored value untouched.
///
/// The owner is deliberately absent: ownership cannot be transferred.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingUpdate {
    pub name: Option<String>,
    pub pet_type: Option<String>,
    pub breed: Option<String>,
    pub sex: Option<Sex>,
    pub date_of_birth: Option<NaiveDate>,
}

impl ListingUpdate {
    /// Validate the provided fields; an update with no fields is rejected.
    pub fn validated(self, today: NaiveDate) -> Result<Self, DomainError> {
        if self.is_empty() {
            return Err(DomainError::validation("no fields to update"));
        }
        Ok(Self {
            name: self
                .name
                .map(|v| validate_required("name", &v, MAX_NAME_LEN))
                .transpose()?,
            pet_type: self
                .pet_type
                .map(|v| validate_required("pet_type", &v, MAX_PET_TYPE_LEN))
                .transpose()?,
            breed: self
                .breed
                .map(|v| validate_optional("breed", &v, MAX_BREED_LEN))
                .transpose()?,
            sex: self.sex,
            date_of_birth: self
                .date_of_birth
                .map(|d| validate_dob(d, today))
                .transpose()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.pet_type.is_none()
            && self.breed.is_none()
            && self.sex.is_none()
            && self.date_of_birth.is_none()
    }

    /// Apply the update in place and bump `updated_at`.
    pub fn apply_to(&self, listing: &mut Listing, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            listing.name = name.clone();
        }
        if let Some(pet_type) = &self.pet_type {
            listing.pet_type = pet_type.clone();
        }
        if let Some(breed) = &self.breed {
            listing.breed = breed.clone();
        }
        if let Some(sex) = self.sex {
            listing.sex = sex;
        }
        if let Some(dob) = self.date_of_birth {
            listing.date_of_birth = dob;
        }
        listing.updated_at = now.max(listing.created_at);
    }
}

fn validate_required(field: &str, value: &str, max: usize) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    validate_optional(field, trimmed, max)
}

fn validate_optional(field: &str, value: &str, max: usize) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{field} cannot be longer than {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_dob(dob: NaiveDate, today: NaiveDate) -> Result<NaiveDate, DomainError> {
    if dob > today {
        return Err(DomainError::validation("date_of_birth cannot be in the future"));
    }
    Ok(dob)
}
