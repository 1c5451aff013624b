//! Map surface manager: surface + tile layer lifetime and the view.

use super::{MapBackend, MapError, MountTarget, TileLayerSpec, DEFAULT_ZOOM};
use crate::location::Coordinate;

/// The live surface, its tile layer and (once placed) its single marker.
pub struct MapSession<B: MapBackend> {
    pub(crate) surface: B::Surface,
    _layer: B::Layer,
    pub(crate) marker: Option<B::Marker>,
}

impl<B: MapBackend> MapSession<B> {
    /// Create the surface at the default view and attach the tile layer.
    ///
    /// Nothing is constructed if the backend rejects the target.
    pub fn initialize(backend: &mut B, target: &MountTarget) -> Result<Self, MapError> {
        let mut surface = backend.create_surface(target)?;
        backend.set_view(&mut surface, Coordinate::DEFAULT, DEFAULT_ZOOM);
        let layer = backend.add_tile_layer(&mut surface, &TileLayerSpec::default());
        tracing::debug!(container = target.id(), "map surface initialized");
        Ok(Self { surface, _layer: layer, marker: None })
    }

    /// Re-center at the fixed zoom.
    pub fn set_view(&mut self, backend: &mut B, center: Coordinate) {
        backend.set_view(&mut self.surface, center, DEFAULT_ZOOM);
    }

    pub fn invalidate_size(&mut self, backend: &mut B) {
        backend.invalidate_size(&mut self.surface);
    }

    pub fn has_marker(&self) -> bool {
        self.marker.is_some()
    }

    /// Tear the surface down. Layer and marker go with it.
    pub fn release(self, backend: &mut B) {
        backend.remove_surface(self.surface);
    }
}
