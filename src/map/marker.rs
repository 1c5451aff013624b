//! Marker coordinator: turns a resolution outcome into the session's one marker.

use serde::Serialize;

use super::{MapBackend, MapSession};
use crate::location::{Coordinate, ResolutionOutcome};

pub const FALLBACK_POPUP: &str = "Default location - unable to fetch your IP info.";

/// Where the marker ended up and what it says.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub at: Coordinate,
    pub popup: String,
    pub resolved: bool,
}

/// Place the marker for `outcome`. Returns `None` if the session already has one.
pub fn place_marker<B: MapBackend>(
    backend: &mut B,
    session: &mut MapSession<B>,
    outcome: &ResolutionOutcome,
) -> Option<Placement> {
    if session.has_marker() {
        tracing::warn!("session already has a marker; ignoring outcome");
        return None;
    }

    let placement = match outcome {
        ResolutionOutcome::Resolved(info) => {
            let at = info.coordinate;
            let popup = info.popup_label();
            session.set_view(backend, at);
            let mut marker = backend.create_marker(at);
            backend.add_marker_to(&mut marker, &mut session.surface);
            backend.bind_popup(&mut marker, &popup);
            backend.open_popup(&mut marker);
            session.marker = Some(marker);
            Placement { at, popup, resolved: true }
        }
        ResolutionOutcome::Unresolved(reason) => {
            // The default view is already applied; leave it alone.
            let at = Coordinate::DEFAULT;
            let mut marker = backend.create_marker(at);
            backend.bind_popup(&mut marker, FALLBACK_POPUP);
            backend.add_marker_to(&mut marker, &mut session.surface);
            backend.open_popup(&mut marker);
            session.marker = Some(marker);
            tracing::info!(%reason, "placed default marker");
            Placement { at, popup: FALLBACK_POPUP.to_string(), resolved: false }
        }
    };

    Some(placement)
}
