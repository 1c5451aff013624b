//! locmap: a map widget that centers on the caller's IP location.
//!
//! The map is drawn at a default view immediately; a single ipinfo.io lookup
//! then moves it to the caller's approximate location, or leaves a default
//! marker when the lookup fails in any way.

pub mod config;
pub mod location;
pub mod map;
pub mod server;
pub mod widget;

pub use config::MapConfig;
pub use widget::{MapWidget, WidgetError, WidgetState};
