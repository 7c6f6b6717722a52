//! Bazaar dashboard server.
//!
//! Serves the admin and vendor dashboard API. Listens on
//! `DASHBOARD_HOST:DASHBOARD_PORT` (127.0.0.1:3000 by default), over TLS
//! when `DASHBOARD_TLS_CERT` and `DASHBOARD_TLS_KEY` are set.
//!
//! Migrations are not run on startup; use `bazaar migrate`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use secrecy::ExposeSecret;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use bazaar_dashboard::config::{DashboardConfig, TlsConfig};
use bazaar_dashboard::middleware::create_session_layer;
use bazaar_dashboard::state::AppState;
use bazaar_dashboard::{app, db};

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "bazaar_dashboard=info,tower_http=debug";

/// How long in-flight requests may run after a stop signal.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Start error reporting when a DSN is configured. Events stop when the
/// guard drops.
fn init_sentry(config: &DashboardConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_deref()?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config.sentry_environment.clone().map(Into::into),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            // Vendor and customer emails stay in Postgres.
            send_default_pii: false,
            ..Default::default()
        },
    ));
    Some(guard)
}

/// Warnings and errors become Sentry events; info and debug ride along as
/// breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the global subscriber. `BAZAAR_LOG_JSON` switches to one JSON
/// object per line.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = std::env::var_os("BAZAAR_LOG_JSON").is_some();

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true)))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("ring crypto provider already installed");

    let config = DashboardConfig::from_env().expect("invalid dashboard configuration");

    // The tracing layer forwards to whatever client exists when it is built.
    let _sentry = init_sentry(&config);
    init_tracing();
    if config.sentry_dsn.is_some() {
        tracing::info!(environment = ?config.sentry_environment, "error reporting enabled");
    }

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("cannot connect to the marketplace database");
    let session_layer =
        create_session_layer(&pool, &config).expect("cannot build the session store");

    let addr = config.socket_addr();
    let tls = config.tls.clone();
    let app = app(AppState::new(config, pool), session_layer);

    match tls {
        Some(tls) => serve_tls(addr, &tls, app).await,
        None => serve(addr, app).await,
    }
    tracing::info!("dashboard stopped");
}

async fn serve(addr: SocketAddr, app: Router) {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("cannot listen on {addr}: {e}"));
    tracing::info!(%addr, "dashboard API ready (plain HTTP)");

    axum::serve(listener, app)
        .with_graceful_shutdown(stop_requested())
        .await
        .expect("dashboard server failed");
}

async fn serve_tls(addr: SocketAddr, tls: &TlsConfig, app: Router) {
    let rustls = RustlsConfig::from_pem(
        tls.cert_pem.as_bytes().to_vec(),
        tls.key_pem.expose_secret().as_bytes().to_vec(),
    )
    .await
    .expect("DASHBOARD_TLS_CERT / DASHBOARD_TLS_KEY are not a usable PEM pair");

    let handle = Handle::new();
    let drain = handle.clone();
    tokio::spawn(async move {
        stop_requested().await;
        drain.graceful_shutdown(Some(DRAIN_TIMEOUT));
    });

    tracing::info!(%addr, "dashboard API ready (TLS)");
    axum_server::bind_rustls(addr, rustls)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .expect("dashboard server failed");
}

/// Resolves on Ctrl+C, or on SIGTERM from the process supervisor.
async fn stop_requested() {
    let interrupt = async {
        tokio::signal::ctrl_c()
            .await
            .expect("cannot listen for Ctrl+C");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("cannot listen for SIGTERM")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        () = interrupt => "SIGINT",
        () = terminate => "SIGTERM",
    };
    tracing::info!(signal, "draining open requests");
}
