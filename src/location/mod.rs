//! Location subsystem for locmap.
//!
//! Provides the IP-based lookup against ipinfo.io, the transport seam it
//! runs over, and the outcome types the map widget consumes.

pub mod providers;
pub mod resolver;
pub mod types;

pub use providers::{HttpResponse, Transport, UreqTransport};
pub use resolver::{LocationResolver, FETCH_ERROR_PREFIX};
pub use types::{Coordinate, LocationInfo, LookupError, ResolutionOutcome, TransportError, UnresolvedReason};
