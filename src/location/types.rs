//! Core types for the location subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A point on the map in decimal degrees.
///
/// Always within lat -90..=90, lng -180..=180 and finite. Use [`Coordinate::new`]
/// to build one from untrusted numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Where the map starts and where the fallback marker goes.
    pub const DEFAULT: Coordinate = Coordinate { lat: 51.505, lng: -0.09 };

    /// Validate a lat/lng pair. Returns `None` for anything off the globe.
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return None;
        }
        Some(Self { lat, lng })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lat, self.lng)
    }
}

/// What the IP lookup told us about the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    pub coordinate: Coordinate,
}

impl LocationInfo {
    /// Popup text for a resolved marker.
    ///
    /// Absent fields are substituted as empty strings; the separators stay.
    pub fn popup_label(&self) -> String {
        format!(
            "Your approximate location:<br>{}, {}, {}",
            self.city.as_deref().unwrap_or(""),
            self.region.as_deref().unwrap_or(""),
            self.country.as_deref().unwrap_or(""),
        )
    }
}

/// Why a lookup did not produce a usable location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnresolvedReason {
    NetworkError,
    NonOkStatus,
    MalformedBody,
    MissingCoordinateField,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkError => write!(f, "network-error"),
            Self::NonOkStatus => write!(f, "non-ok-status"),
            Self::MalformedBody => write!(f, "malformed-body"),
            Self::MissingCoordinateField => write!(f, "missing-coordinate-field"),
        }
    }
}

/// Result of the single lookup performed per mount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    Resolved(LocationInfo),
    Unresolved(UnresolvedReason),
}

impl ResolutionOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// The transport could not complete the request at all.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Lookup failures, kept distinct for diagnostics.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(#[from] TransportError),
    #[error("Lookup returned HTTP {0}")]
    Status(u16),
    #[error("Invalid lookup response: {0}")]
    Malformed(String),
    #[error("Lookup response has no 'loc' field")]
    MissingLocation,
}

impl LookupError {
    pub fn reason(&self) -> UnresolvedReason {
        match self {
            Self::Network(_) => UnresolvedReason::NetworkError,
            Self::Status(_) => UnresolvedReason::NonOkStatus,
            Self::Malformed(_) => UnresolvedReason::MalformedBody,
            Self::MissingLocation => UnresolvedReason::MissingCoordinateField,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_bounds() {
        assert!(Coordinate::new(90.0, 180.0).is_some());
        assert!(Coordinate::new(-90.0, -180.0).is_some());
        assert!(Coordinate::new(90.01, 0.0).is_none());
        assert!(Coordinate::new(0.0, -180.5).is_none());
        assert!(Coordinate::new(f64::NAN, 0.0).is_none());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_none());
    }

    #[test]
    fn test_default_coordinate_is_valid() {
        let d = Coordinate::DEFAULT;
        assert_eq!(Coordinate::new(d.lat, d.lng), Some(d));
    }

    #[test]
    fn test_popup_label_full() {
        let info = LocationInfo {
            city: Some("Los Angeles".into()),
            region: Some("CA".into()),
            country: Some("US".into()),
            coordinate: Coordinate { lat: 34.0522, lng: -118.2437 },
        };
        assert_eq!(info.popup_label(), "Your approximate location:<br>Los Angeles, CA, US");
    }

    #[test]
    fn test_popup_label_partial_keeps_separators() {
        let info = LocationInfo {
            city: Some("Oslo".into()),
            region: None,
            country: Some("NO".into()),
            coordinate: Coordinate { lat: 59.9, lng: 10.7 },
        };
        assert_eq!(info.popup_label(), "Your approximate location:<br>Oslo, , NO");
    }

    #[test]
    fn test_lookup_error_reasons() {
        assert_eq!(
            LookupError::Network(TransportError("refused".into())).reason(),
            UnresolvedReason::NetworkError
        );
        assert_eq!(LookupError::Status(500).reason(), UnresolvedReason::NonOkStatus);
        assert_eq!(LookupError::Malformed("x".into()).reason(), UnresolvedReason::MalformedBody);
        assert_eq!(LookupError::MissingLocation.reason(), UnresolvedReason::MissingCoordinateField);
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let json = serde_json::to_value(ResolutionOutcome::Unresolved(UnresolvedReason::NonOkStatus)).unwrap();
        assert_eq!(json["status"], "unresolved");
        assert_eq!(json["detail"], "non-ok-status");
    }
}
