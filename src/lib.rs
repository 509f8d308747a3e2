pub mod availability;
pub mod backend;
pub mod clock;
pub mod error;
pub mod expander;
pub mod handlers;
pub mod ical;
pub mod models;
pub mod openapi;
pub mod settings;
pub mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use handlers::{
    create_booking, get_available_dates, get_slots, get_slots_ical, healthz_live, healthz_ready,
    root,
};
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::backend::BackendClient;
use crate::clock::{Clock, SystemClock};
use crate::expander::AvailabilityExpander;
use crate::ical::ICalExporter;
use crate::openapi::ApiDoc;
use crate::settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pub(crate) settings: Settings,
    pub(crate) backend: Arc<BackendClient>,
    pub(crate) expander: Arc<AvailabilityExpander<Arc<dyn Clock>>>,
    pub(crate) exporter: Arc<ICalExporter>,
}

impl AppState {
    pub fn new(settings: Settings, clock: Arc<dyn Clock>) -> Self {
        let backend = BackendClient::new(settings.backend_base_url.clone());
        Self {
            settings,
            backend: Arc::new(backend),
            expander: Arc::new(AvailabilityExpander::new(clock)),
            exporter: Arc::new(ICalExporter::new()),
        }
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    let env_filter = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .init();

    let tz = settings.tz()?;
    let state = AppState::new(settings, Arc::new(SystemClock::new(tz)));

    let app = build_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.settings.port));
    info!(%tz, backend = %state.settings.backend_base_url, "Starting Tutor Slots API on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    let mut router = Router::new()
        .route("/", get(root))
        .route("/healthz/live", get(healthz_live))
        .route("/healthz/ready", get(healthz_ready))
        .route("/tutors/{tutor_id}/dates", get(get_available_dates))
        .route("/tutors/{tutor_id}/slots", get(get_slots))
        .route("/tutors/{tutor_id}/slots.ical", get(get_slots_ical))
        .route("/tutors/{tutor_id}/bookings", post(create_booking))
        .with_state(state.clone());

    if state.settings.enable_swagger {
        let openapi = ApiDoc::openapi();
        let swagger = SwaggerUi::new("/docs").url("/openapi.json", openapi);
        router = router.merge(swagger);
    }

    router.layer(trace_layer)
}
