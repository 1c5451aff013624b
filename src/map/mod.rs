//! Map drawing boundary.
//!
//! The widget never talks to a drawing library directly; it goes through
//! [`MapBackend`], so any implementation of that capability set can host it.

pub mod marker;
pub mod recording;
pub mod surface;

use crate::location::Coordinate;
use serde::Serialize;
use thiserror::Error;

pub use marker::{place_marker, Placement, FALLBACK_POPUP};
pub use recording::{MapCall, RecordingBackend};
pub use surface::MapSession;

/// Zoom used for both the default and the resolved view.
pub const DEFAULT_ZOOM: u8 = 13;

pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("Invalid mount target '{0}'")]
    InvalidContainer(String),
}

/// The container element a surface is drawn into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountTarget {
    id: String,
}

impl MountTarget {
    /// A target must be a non-empty id without whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, MapError> {
        let id = id.into();
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            return Err(MapError::InvalidContainer(id));
        }
        Ok(Self { id })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Tile source attached once per surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileLayerSpec {
    pub url: String,
    pub attribution: String,
}

impl Default for TileLayerSpec {
    fn default() -> Self {
        Self {
            url: TILE_URL.to_string(),
            attribution: TILE_ATTRIBUTION.to_string(),
        }
    }
}

/// Capability set of a map drawing library.
pub trait MapBackend: Send + 'static {
    type Surface: Send;
    type Layer: Send;
    type Marker: Send;

    fn create_surface(&mut self, target: &MountTarget) -> Result<Self::Surface, MapError>;
    fn set_view(&mut self, surface: &mut Self::Surface, center: Coordinate, zoom: u8);
    fn add_tile_layer(&mut self, surface: &mut Self::Surface, spec: &TileLayerSpec) -> Self::Layer;
    fn create_marker(&mut self, at: Coordinate) -> Self::Marker;
    fn add_marker_to(&mut self, marker: &mut Self::Marker, surface: &mut Self::Surface);
    fn bind_popup(&mut self, marker: &mut Self::Marker, text: &str);
    fn open_popup(&mut self, marker: &mut Self::Marker);
    fn invalidate_size(&mut self, surface: &mut Self::Surface);
    fn remove_surface(&mut self, surface: Self::Surface);
}
