//! Headless backend that records every map call.
//!
//! Used by the CLI and the server (the browser replays the log onto Leaflet)
//! and by tests to assert what the widget drew.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use super::{MapBackend, MapError, MountTarget, TileLayerSpec};
use crate::location::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SurfaceId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkerId(pub u32);

/// One call made against the backend, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MapCall {
    CreateSurface { surface: SurfaceId, container: String },
    SetView { surface: SurfaceId, center: Coordinate, zoom: u8 },
    AddTileLayer { surface: SurfaceId, layer: LayerId, url: String, attribution: String },
    CreateMarker { marker: MarkerId, at: Coordinate },
    AddMarker { marker: MarkerId, surface: SurfaceId },
    BindPopup { marker: MarkerId, text: String },
    OpenPopup { marker: MarkerId },
    InvalidateSize { surface: SurfaceId },
    RemoveSurface { surface: SurfaceId },
}

#[derive(Default)]
struct Log {
    calls: Vec<MapCall>,
    next_id: u32,
}

/// Cloning shares the same log, so a test can keep a handle while the widget owns the backend.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    log: Arc<Mutex<Log>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    pub fn calls(&self) -> Vec<MapCall> {
        self.lock().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&MapCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn surfaces_created(&self) -> usize {
        self.count(|c| matches!(c, MapCall::CreateSurface { .. }))
    }

    pub fn tile_layers_added(&self) -> usize {
        self.count(|c| matches!(c, MapCall::AddTileLayer { .. }))
    }

    pub fn markers_created(&self) -> usize {
        self.count(|c| matches!(c, MapCall::CreateMarker { .. }))
    }

    /// Every center passed to `set_view`, oldest first.
    pub fn views(&self) -> Vec<(Coordinate, u8)> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                MapCall::SetView { center, zoom, .. } => Some((*center, *zoom)),
                _ => None,
            })
            .collect()
    }

    /// Every popup text bound, oldest first.
    pub fn popups(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                MapCall::BindPopup { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Log> {
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: MapCall) {
        self.lock().calls.push(call);
    }

    fn next_id(&self) -> u32 {
        let mut log = self.lock();
        log.next_id += 1;
        log.next_id
    }
}

impl MapBackend for RecordingBackend {
    type Surface = SurfaceId;
    type Layer = LayerId;
    type Marker = MarkerId;

    fn create_surface(&mut self, target: &MountTarget) -> Result<SurfaceId, MapError> {
        let surface = SurfaceId(self.next_id());
        self.record(MapCall::CreateSurface {
            surface,
            container: target.id().to_string(),
        });
        Ok(surface)
    }

    fn set_view(&mut self, surface: &mut SurfaceId, center: Coordinate, zoom: u8) {
        self.record(MapCall::SetView { surface: *surface, center, zoom });
    }

    fn add_tile_layer(&mut self, surface: &mut SurfaceId, spec: &TileLayerSpec) -> LayerId {
        let layer = LayerId(self.next_id());
        self.record(MapCall::AddTileLayer {
            surface: *surface,
            layer,
            url: spec.url.clone(),
            attribution: spec.attribution.clone(),
        });
        layer
    }

    fn create_marker(&mut self, at: Coordinate) -> MarkerId {
        let marker = MarkerId(self.next_id());
        self.record(MapCall::CreateMarker { marker, at });
        marker
    }

    fn add_marker_to(&mut self, marker: &mut MarkerId, surface: &mut SurfaceId) {
        self.record(MapCall::AddMarker { marker: *marker, surface: *surface });
    }

    fn bind_popup(&mut self, marker: &mut MarkerId, text: &str) {
        self.record(MapCall::BindPopup { marker: *marker, text: text.to_string() });
    }

    fn open_popup(&mut self, marker: &mut MarkerId) {
        self.record(MapCall::OpenPopup { marker: *marker });
    }

    fn invalidate_size(&mut self, surface: &mut SurfaceId) {
        self.record(MapCall::InvalidateSize { surface: *surface });
    }

    fn remove_surface(&mut self, surface: SurfaceId) {
        self.record(MapCall::RemoveSurface { surface });
    }
}
