use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::location::ResolutionOutcome;
use crate::map::{MapCall, MountTarget, Placement, RecordingBackend};
use crate::widget::{MapWidget, WidgetError, WidgetState};

use super::state::AppState;
use super::static_files;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

#[derive(Debug)]
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

impl From<WidgetError> for ApiError {
    fn from(e: WidgetError) -> Self {
        let status = match e {
            WidgetError::Map(_) => StatusCode::BAD_REQUEST,
            WidgetError::Unmounted | WidgetError::AlreadyResolving => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(status, e.to_string())
    }
}

// ─── Static file handlers ────────────────────────────────────────

pub async fn index() -> Html<&'static str> {
    Html(static_files::INDEX_HTML)
}

pub async fn script() -> Response {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        static_files::APP_JS,
    )
        .into_response()
}

// ─── GET /api/session ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SessionQuery {
    pub container: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub state: WidgetState,
    pub outcome: Option<ResolutionOutcome>,
    pub placement: Option<Placement>,
    pub calls: Vec<MapCall>,
}

/// Mount a widget headlessly, let it resolve, and hand back its draw calls
/// for the browser to replay onto Leaflet.
pub async fn session(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SessionQuery>,
) -> Result<Json<SessionResponse>, ApiError> {
    let start = Instant::now();

    let container = params.container.unwrap_or_else(|| "map".to_string());
    let target = MountTarget::new(container).map_err(WidgetError::from)?;

    let backend = RecordingBackend::new();
    let widget = MapWidget::run(backend.clone(), &target, Arc::clone(&state.resolver)).await?;

    let response = SessionResponse {
        state: widget.state(),
        outcome: widget.outcome(),
        placement: widget.placement(),
        calls: backend.calls(),
    };
    widget.unmount();

    tracing::info!(
        state = %response.state,
        calls = response.calls.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/session"
    );

    Ok(Json(response))
}

// ─── GET /api/outcome ────────────────────────────────────────────

pub async fn outcome(State(state): State<Arc<AppState>>) -> Json<ResolutionOutcome> {
    let start = Instant::now();
    let outcome = Arc::clone(&state.resolver).resolve_async().await;
    tracing::info!(
        resolved = outcome.is_resolved(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/outcome"
    );
    Json(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use crate::location::resolver::tests::StubTransport;
    use crate::location::{LocationResolver, UnresolvedReason};
    use crate::map::FALLBACK_POPUP;

    fn app_state(stub: StubTransport) -> Arc<AppState> {
        let config = MapConfig::new(Some("test_token".into()), None).unwrap();
        Arc::new(AppState {
            resolver: Arc::new(LocationResolver::with_transport(&config, stub)),
        })
    }

    #[tokio::test]
    async fn test_session_resolved() {
        let state = app_state(StubTransport::ok(
            r#"{"loc":"40.7128,-74.0060","city":"New York","region":"NY","country":"US"}"#,
        ));
        let Json(resp) = session(State(state), Query(SessionQuery { container: None }))
            .await
            .unwrap();

        assert_eq!(resp.state, WidgetState::ResolvedPlaced);
        let placement = resp.placement.unwrap();
        assert_eq!(placement.popup, "Your approximate location:<br>New York, NY, US");
        assert!(matches!(&resp.calls[0], MapCall::CreateSurface { container, .. } if container == "map"));
        assert!(!resp.calls.iter().any(|c| matches!(c, MapCall::RemoveSurface { .. })));
    }

    #[tokio::test]
    async fn test_session_fallback() {
        let state = app_state(StubTransport::status(429, ""));
        let Json(resp) = session(State(state), Query(SessionQuery { container: Some("widget".into()) }))
            .await
            .unwrap();

        assert_eq!(resp.state, WidgetState::UnresolvedPlaced);
        assert_eq!(resp.outcome, Some(ResolutionOutcome::Unresolved(UnresolvedReason::NonOkStatus)));
        assert_eq!(resp.placement.unwrap().popup, FALLBACK_POPUP);
    }

    #[tokio::test]
    async fn test_session_bad_container() {
        let state = app_state(StubTransport::ok(r#"{"loc":"1,2"}"#));
        let err = session(State(state), Query(SessionQuery { container: Some("two words".into()) }))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_outcome_endpoint() {
        let state = app_state(StubTransport::failing("connection refused"));
        let Json(result) = outcome(State(state)).await;
        assert_eq!(result, ResolutionOutcome::Unresolved(UnresolvedReason::NetworkError));
    }
}
