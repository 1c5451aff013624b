//! The location-aware map widget.
//!
//! Lifecycle: `Mounted → Initializing → Resolving → {ResolvedPlaced | UnresolvedPlaced} → Unmounted`.
//!
//! Mounting draws the default view synchronously. The IP lookup runs as a
//! one-shot tokio task whose continuation places the marker, provided the
//! widget is still mounted when the lookup settles.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::location::{LocationResolver, ResolutionOutcome};
use crate::map::{place_marker, MapBackend, MapError, MapSession, MountTarget, Placement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetState {
    Mounted,
    Initializing,
    Resolving,
    ResolvedPlaced,
    UnresolvedPlaced,
    Unmounted,
}

impl WidgetState {
    pub fn is_placed(self) -> bool {
        matches!(self, Self::ResolvedPlaced | Self::UnresolvedPlaced)
    }
}

impl fmt::Display for WidgetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mounted => write!(f, "mounted"),
            Self::Initializing => write!(f, "initializing"),
            Self::Resolving => write!(f, "resolving"),
            Self::ResolvedPlaced => write!(f, "resolved"),
            Self::UnresolvedPlaced => write!(f, "unresolved"),
            Self::Unmounted => write!(f, "unmounted"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WidgetError {
    #[error(transparent)]
    Map(#[from] MapError),
    #[error("Widget is unmounted")]
    Unmounted,
    #[error("Location resolution already started for this mount")]
    AlreadyResolving,
}

struct Inner<B: MapBackend> {
    backend: B,
    session: Option<MapSession<B>>,
    state: WidgetState,
    history: Vec<WidgetState>,
    outcome: Option<ResolutionOutcome>,
    placement: Option<Placement>,
    listening: bool,
}

impl<B: MapBackend> Inner<B> {
    fn transition(&mut self, to: WidgetState) {
        tracing::debug!(from = %self.state, %to, "map widget state");
        self.state = to;
        self.history.push(to);
    }
}

/// One mounted map widget. Cloning yields another handle to the same instance.
pub struct MapWidget<B: MapBackend> {
    inner: Arc<Mutex<Inner<B>>>,
}

impl<B: MapBackend> Clone for MapWidget<B> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<B: MapBackend> MapWidget<B> {
    /// Draw the surface at the default view with its tile layer.
    pub fn mount(backend: B, target: &MountTarget) -> Result<Self, WidgetError> {
        let mut inner = Inner {
            backend,
            session: None,
            state: WidgetState::Mounted,
            history: vec![WidgetState::Mounted],
            outcome: None,
            placement: None,
            listening: false,
        };
        tracing::debug!(container = target.id(), "mounting map widget");

        inner.transition(WidgetState::Initializing);
        inner.session = Some(MapSession::initialize(&mut inner.backend, target)?);
        inner.listening = true;

        Ok(Self { inner: Arc::new(Mutex::new(inner)) })
    }

    /// Mount, resolve, place. Returns once the marker is down.
    pub async fn run(
        backend: B,
        target: &MountTarget,
        resolver: Arc<LocationResolver>,
    ) -> Result<Self, WidgetError> {
        let widget = Self::mount(backend, target)?;
        let handle = widget.spawn_resolution(resolver)?;
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "resolution task failed");
        }
        Ok(widget)
    }

    /// Start the single lookup for this mount.
    ///
    /// The returned task yields whether the marker was placed; it is `false`
    /// when the widget was unmounted before the lookup settled.
    pub fn spawn_resolution(&self, resolver: Arc<LocationResolver>) -> Result<JoinHandle<bool>, WidgetError> {
        {
            let mut inner = self.lock();
            match inner.state {
                WidgetState::Unmounted => return Err(WidgetError::Unmounted),
                WidgetState::Initializing => inner.transition(WidgetState::Resolving),
                _ => return Err(WidgetError::AlreadyResolving),
            }
        }
        tracing::debug!(url = resolver.url(), "resolving IP location");

        let widget = self.clone();
        Ok(tokio::spawn(async move {
            let outcome = resolver.resolve_async().await;
            widget.place(outcome).is_some()
        }))
    }

    /// Apply a settled outcome. Dropped unless the widget is mounted and resolving.
    pub fn place(&self, outcome: ResolutionOutcome) -> Option<Placement> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if inner.state != WidgetState::Resolving {
            tracing::debug!(state = %inner.state, "discarding resolution outcome");
            return None;
        }
        let session = inner.session.as_mut()?;

        let placement = place_marker(&mut inner.backend, session, &outcome)?;
        inner.transition(if outcome.is_resolved() {
            WidgetState::ResolvedPlaced
        } else {
            WidgetState::UnresolvedPlaced
        });
        inner.outcome = Some(outcome);
        inner.placement = Some(placement.clone());
        Some(placement)
    }

    /// Container resized. Same behavior in every mounted state.
    pub fn handle_resize(&self) -> Result<(), WidgetError> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if !inner.listening {
            return Err(WidgetError::Unmounted);
        }
        let session = inner.session.as_mut().ok_or(WidgetError::Unmounted)?;
        session.invalidate_size(&mut inner.backend);
        Ok(())
    }

    /// Release the surface and detach listeners. Idempotent.
    pub fn unmount(&self) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        inner.listening = false;
        if let Some(session) = inner.session.take() {
            session.release(&mut inner.backend);
            inner.transition(WidgetState::Unmounted);
        }
    }

    pub fn state(&self) -> WidgetState {
        self.lock().state
    }

    /// Every state this instance has been in, oldest first.
    pub fn history(&self) -> Vec<WidgetState> {
        self.lock().history.clone()
    }

    pub fn outcome(&self) -> Option<ResolutionOutcome> {
        self.lock().outcome.clone()
    }

    pub fn placement(&self) -> Option<Placement> {
        self.lock().placement.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner<B>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
