//! Tagged-location datastore for loctag.
//!
//! This module handles the storage and retrieval of tagged locations in a
//! YAML-based datastore file. It defines the `LocationStore` struct for the
//! overall collection and the `TaggedLocation` struct to represent one
//! tagged place.
//!
//! A record captures what the user tagged and where:
//! - Description and category
//! - Coordinates and the date of tagging
//! - The address resolved at tag time (if any)
//! - An optional photo attachment (path plus content checksum)
//!
//! Listing groups records by category and orders each group by date, which
//! is how the records are presented to the user.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::geocode::AddressRecord;

/// The category vocabulary offered when tagging
pub const CATEGORIES: &[&str] = &[
    "No Category",
    "Apple Store",
    "Bar",
    "Bookstore",
    "Club",
    "Grocery Store",
    "Historic Building",
    "House",
    "Icecream Vendor",
    "Landmark",
    "Park",
];

/// One tagged location in the datastore
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedLocation {
    /// Unique identifier for this record
    pub id: String,
    /// What the user wrote about this place
    pub description: String,
    /// One of the category names (free-form values are accepted)
    pub category: String,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// When the place was tagged
    pub date: DateTime<Utc>,
    /// Address resolved at tag time
    pub address: Option<AddressRecord>,
    /// Path to an attached photo, if one was added
    pub photo_path: Option<PathBuf>,
    /// Checksum of the attached photo's content (for detecting changes)
    pub photo_checksum: Option<String>,
}

impl TaggedLocation {
    /// Creates a new record with a fresh id and the current time
    pub fn new(description: String, category: String, latitude: f64, longitude: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description,
            category,
            latitude,
            longitude,
            date: Utc::now(),
            address: None,
            photo_path: None,
            photo_checksum: None,
        }
    }

    /// Record the address resolved for this location
    pub fn set_address(&mut self, address: AddressRecord) {
        self.address = Some(address);
    }

    /// Attach a photo by path, checksumming its content
    pub fn attach_photo(&mut self, path: &Path) -> Result<()> {
        let content = fs::read(path)
            .with_context(|| format!("Failed to read photo from {}", path.display()))?;

        self.photo_checksum = Some(format!("{:x}", md5::compute(&content)));
        self.photo_path = Some(path.to_path_buf());
        Ok(())
    }

    pub fn has_photo(&self) -> bool {
        self.photo_path.is_some()
    }

    /// Title shown in listings: the description, or a placeholder when
    /// the user left it empty
    pub fn title(&self) -> &str {
        if self.description.trim().is_empty() {
            "(No Description)"
        } else {
            &self.description
        }
    }
}

/// The local datastore of tagged locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationStore {
    /// When the store was last modified
    pub last_updated: DateTime<Utc>,
    /// Map of record ids to tagged locations
    pub locations: HashMap<String, TaggedLocation>,
}

impl LocationStore {
    /// Creates a new empty store
    pub fn new() -> Self {
        Self {
            last_updated: Utc::now(),
            locations: HashMap::new(),
        }
    }

    /// Load the store from the specified path
    pub fn load(path: &Path) -> Result<Self> {
        // If the file doesn't exist, create a new empty store
        if !path.exists() {
            return Ok(Self::new());
        }

        let yaml = fs::read_to_string(path)
            .with_context(|| format!("Failed to read datastore from {}", path.display()))?;

        let store: LocationStore = serde_yaml::from_str(&yaml)
            .with_context(|| format!("Failed to parse datastore from {}", path.display()))?;

        Ok(store)
    }

    /// Save the store to the specified path
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory for {}", path.display())
                })?;
            }
        }

        let yaml =
            serde_yaml::to_string(self).with_context(|| "Failed to serialize datastore to YAML")?;

        fs::write(path, yaml)
            .with_context(|| format!("Failed to write datastore to {}", path.display()))?;

        Ok(())
    }

    /// Add or update a record
    pub fn add_or_update(&mut self, location: TaggedLocation) {
        self.locations.insert(location.id.clone(), location);
        self.last_updated = Utc::now();
    }

    /// Remove a record by id
    pub fn remove(&mut self, id: &str) -> Option<TaggedLocation> {
        let result = self.locations.remove(id);
        if result.is_some() {
            self.last_updated = Utc::now();
        }
        result
    }

    /// Get a record by id
    pub fn get(&self, id: &str) -> Option<&TaggedLocation> {
        self.locations.get(id)
    }

    /// Number of records in the store
    pub fn count(&self) -> usize {
        self.locations.len()
    }

    /// Number of records with a resolved address
    pub fn with_address_count(&self) -> usize {
        self.locations
            .values()
            .filter(|location| location.address.is_some())
            .count()
    }

    /// Number of records with a photo attached
    pub fn with_photo_count(&self) -> usize {
        self.locations
            .values()
            .filter(|location| location.has_photo())
            .count()
    }

    /// Records grouped by category (ascending) and ordered by date within
    /// each group
    pub fn by_category(&self) -> Vec<(String, Vec<&TaggedLocation>)> {
        let mut groups: Vec<(String, Vec<&TaggedLocation>)> = Vec::new();

        let mut sorted: Vec<&TaggedLocation> = self.locations.values().collect();
        sorted.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.date.cmp(&b.date))
        });

        for location in sorted {
            match groups.last_mut() {
                Some((category, members)) if *category == location.category => {
                    members.push(location);
                }
                _ => groups.push((location.category.clone(), vec![location])),
            }
        }

        groups
    }
}

impl Default for LocationStore {
    fn default() -> Self {
        Self::new()
    }
}
