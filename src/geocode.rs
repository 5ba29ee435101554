//! Reverse geocoding for loctag.
//!
//! This module provides functionality to convert geographic coordinates
//! (latitude/longitude) into human-readable address information.
//!
//! It defines the `AddressRecord` struct to store resolved address data and
//! the `Geocoder` trait as an interface for different geocoding
//! implementations. Two implementations are provided: a mock service that
//! returns predefined locations for certain coordinate ranges (useful for
//! tests and offline use), and a Nominatim client for real lookups.
//!
//! Lookups are asynchronous and best-effort: the acquisition core may
//! abandon a lookup it no longer cares about, so implementations must
//! tolerate their result being discarded.

use anyhow::{Context, Result, anyhow};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::geo::Coordinate;

/// A resolved postal address with the component fields needed for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AddressRecord {
    /// The full formatted address as returned by the geocoder
    pub formatted_address: String,
    /// Street number (e.g., "1600")
    pub house_number: Option<String>,
    /// Street name
    pub street: Option<String>,
    /// City or locality name
    pub city: Option<String>,
    /// State, province, or administrative area
    pub state: Option<String>,
    /// Postal code
    pub postcode: Option<String>,
    /// Country name
    pub country: Option<String>,
}

/// Appends `text` to `line`, inserting `separator` when the line already
/// has content. Absent components are skipped.
fn add_text(line: &mut String, text: Option<&str>, separator: &str) {
    if let Some(text) = text {
        if !line.is_empty() {
            line.push_str(separator);
        }
        line.push_str(text);
    }
}

impl AddressRecord {
    /// Renders the address as up to two display lines: street number and
    /// name on the first, locality/state/postcode on the second. Falls back
    /// to the formatted address when no components are present.
    pub fn display_lines(&self) -> String {
        let mut line1 = String::new();
        add_text(&mut line1, self.house_number.as_deref(), " ");
        add_text(&mut line1, self.street.as_deref(), " ");

        let mut line2 = String::new();
        add_text(&mut line2, self.city.as_deref(), " ");
        add_text(&mut line2, self.state.as_deref(), " ");
        add_text(&mut line2, self.postcode.as_deref(), " ");

        match (line1.is_empty(), line2.is_empty()) {
            (true, true) => self.formatted_address.clone(),
            (true, false) => line2,
            (false, true) => line1,
            (false, false) => format!("{line1}\n{line2}"),
        }
    }
}

impl fmt::Display for AddressRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_lines())
    }
}

/// Interface for reverse geocoding services
pub trait Geocoder: Send + Sync {
    /// Convert a coordinate to an address. The returned future resolves on
    /// the caller's runtime; cancellation is best-effort (dropping the
    /// future abandons the lookup).
    fn reverse_geocode(&self, coordinate: Coordinate) -> BoxFuture<'_, Result<AddressRecord>>;
}

/// Mock geocoding service for testing and offline use
pub struct MockGeocoder;

impl MockGeocoder {
    fn lookup(&self, latitude: f64, longitude: f64) -> AddressRecord {
        // Predefined locations for a few coordinate ranges

        // Chicago area (roughly)
        if latitude > 41.5 && latitude < 42.0 && longitude > -88.0 && longitude < -87.5 {
            return AddressRecord {
                formatted_address: "Chicago, IL, USA".to_string(),
                city: Some("Chicago".to_string()),
                state: Some("Illinois".to_string()),
                country: Some("United States".to_string()),
                ..Default::default()
            };
        }

        // New York area (roughly)
        if latitude > 40.5 && latitude < 41.0 && longitude > -74.5 && longitude < -73.5 {
            return AddressRecord {
                formatted_address: "New York, NY, USA".to_string(),
                city: Some("New York".to_string()),
                state: Some("New York".to_string()),
                country: Some("United States".to_string()),
                ..Default::default()
            };
        }

        // San Francisco area (roughly)
        if latitude > 37.5 && latitude < 38.0 && longitude > -123.0 && longitude < -122.0 {
            return AddressRecord {
                formatted_address: "San Francisco, CA, USA".to_string(),
                city: Some("San Francisco".to_string()),
                state: Some("California".to_string()),
                country: Some("United States".to_string()),
                ..Default::default()
            };
        }

        // London area (roughly)
        if latitude > 51.0 && latitude < 52.0 && longitude > -0.5 && longitude < 0.5 {
            return AddressRecord {
                formatted_address: "London, England, UK".to_string(),
                city: Some("London".to_string()),
                state: Some("England".to_string()),
                country: Some("United Kingdom".to_string()),
                ..Default::default()
            };
        }

        // For any other coordinates, return a generic address based on the quadrant
        let ns = if latitude >= 0.0 { "North" } else { "South" };
        let ew = if longitude >= 0.0 { "East" } else { "West" };

        AddressRecord {
            formatted_address: format!("{ns} {ew} at {latitude:.4}, {longitude:.4}"),
            ..Default::default()
        }
    }
}

impl Geocoder for MockGeocoder {
    fn reverse_geocode(&self, coordinate: Coordinate) -> BoxFuture<'_, Result<AddressRecord>> {
        let record = self.lookup(coordinate.latitude, coordinate.longitude);
        Box::pin(async move { Ok(record) })
    }
}

/// Shape of a Nominatim `/reverse` response (jsonv2 format)
#[derive(Debug, Deserialize)]
struct NominatimResponse {
    display_name: Option<String>,
    address: Option<NominatimAddress>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    house_number: Option<String>,
    road: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
}

/// Reverse geocoder backed by a Nominatim-compatible HTTP endpoint
pub struct NominatimGeocoder {
    client: reqwest::Client,
    endpoint: String,
}

impl NominatimGeocoder {
    /// Creates a client for the given endpoint (e.g.,
    /// `https://nominatim.openstreetmap.org`). Nominatim's usage policy
    /// requires an identifying user agent.
    pub fn new(endpoint: &str, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent.to_string())
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client for geocoding")?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(&self, coordinate: Coordinate) -> Result<AddressRecord> {
        let url = format!(
            "{}/reverse?format=jsonv2&lat={}&lon={}",
            self.endpoint, coordinate.latitude, coordinate.longitude
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Reverse geocoding request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Geocoding service returned HTTP {}",
                response.status()
            ));
        }

        let body: NominatimResponse = response
            .json()
            .await
            .context("Failed to parse geocoding response")?;

        if let Some(error) = body.error {
            return Err(anyhow!("Geocoding service error: {error}"));
        }

        let mut record = AddressRecord {
            formatted_address: body.display_name.unwrap_or_default(),
            ..Default::default()
        };

        if let Some(address) = body.address {
            record.house_number = address.house_number;
            record.street = address.road;
            // Nominatim reports the locality under different keys depending
            // on the place type
            record.city = address.city.or(address.town).or(address.village);
            record.state = address.state;
            record.postcode = address.postcode;
            record.country = address.country;
        }

        Ok(record)
    }
}

impl Geocoder for NominatimGeocoder {
    fn reverse_geocode(&self, coordinate: Coordinate) -> BoxFuture<'_, Result<AddressRecord>> {
        Box::pin(self.fetch(coordinate))
    }
}

/// Factory function to create a geocoding service. With no endpoint
/// configured the offline mock service is used.
pub fn create_geocoder(endpoint: Option<&str>, user_agent: &str) -> Result<Box<dyn Geocoder>> {
    match endpoint {
        Some(endpoint) => Ok(Box::new(NominatimGeocoder::new(endpoint, user_agent)?)),
        None => Ok(Box::new(MockGeocoder)),
    }
}
