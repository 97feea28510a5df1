//! Profile registry.
//!
//! CRUD over the named connection profiles, persisted as an array under the
//! store's `profiles` key. Profile identities are immutable; updates match on
//! id, and removing a profile never touches history entries that reference
//! it — those simply become orphaned.

use crate::models::Profile;
use crate::store::{FileStore, StoreError, PROFILES_KEY};
use std::fmt;

/// Errors that can occur during registry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// No profile with the given id exists.
    NotFound(String),
    /// A profile with the given id already exists.
    DuplicateId(String),
    /// The profile failed validation.
    Invalid(String),
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::NotFound(id) => write!(f, "Profile not found: {}", id),
            ProfileError::DuplicateId(id) => write!(f, "Profile id already exists: {}", id),
            ProfileError::Invalid(msg) => write!(f, "Invalid profile: {}", msg),
        }
    }
}

impl std::error::Error for ProfileError {}

/// The collection of connection profiles.
///
/// Kept in insertion order so profile pickers list profiles the way the user
/// created them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileRegistry {
    profiles: Vec<Profile>,
}

impl ProfileRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the registry from the store's `profiles` key.
    ///
    /// A missing key yields an empty registry.
    pub fn load(store: &FileStore) -> Result<Self, StoreError> {
        let profiles = store.get_as::<Vec<Profile>>(PROFILES_KEY)?.unwrap_or_default();
        Ok(Self { profiles })
    }

    /// Persists the registry under the store's `profiles` key.
    pub fn save(&self, store: &mut FileStore) -> Result<(), StoreError> {
        store.set_as(PROFILES_KEY, &self.profiles)
    }

    /// Returns all profiles in insertion order.
    pub fn list(&self) -> &[Profile] {
        &self.profiles
    }

    /// Returns the number of profiles.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Checks whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Looks up a profile by id.
    pub fn get(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Adds a profile after validating it.
    ///
    /// # Errors
    ///
    /// `ProfileError::Invalid` if validation fails, `ProfileError::DuplicateId`
    /// if a profile with the same id already exists.
    pub fn add(&mut self, profile: Profile) -> Result<(), ProfileError> {
        profile.validate().map_err(ProfileError::Invalid)?;

        if self.get(&profile.id).is_some() {
            return Err(ProfileError::DuplicateId(profile.id));
        }

        self.profiles.push(profile);
        Ok(())
    }

    /// Replaces the profile with the same id.
    ///
    /// The id itself cannot change through an update; the incoming profile's
    /// id selects which entry is replaced.
    ///
    /// # Errors
    ///
    /// `ProfileError::Invalid` if validation fails, `ProfileError::NotFound`
    /// if no profile has the incoming id.
    pub fn update(&mut self, profile: Profile) -> Result<(), ProfileError> {
        profile.validate().map_err(ProfileError::Invalid)?;

        match self.profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => {
                *existing = profile;
                Ok(())
            }
            None => Err(ProfileError::NotFound(profile.id)),
        }
    }

    /// Removes a profile by id.
    ///
    /// # Returns
    ///
    /// The removed profile, or `None` if the id was unknown. History entries
    /// referencing the id are left untouched.
    pub fn remove(&mut self, id: &str) -> Option<Profile> {
        let pos = self.profiles.iter().position(|p| p.id == id)?;
        Some(self.profiles.remove(pos))
    }
}
