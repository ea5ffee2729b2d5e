//! Taper JSON API Server

use std::process;

use salvo::{
    affix_state::inject,
    oapi::{
        OpenApi,
        security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme},
        swagger_ui::SwaggerUi,
    },
    prelude::*,
    trailing_slash::remove_slash,
};
use tracing::{error, info, warn};

use taper_app::{
    context::{AppContext, AppInitError, SigningSettings},
    domain::tokens::SigningTokenSecret,
};

use crate::{auth::AdminKey, config::ServerConfig, state::State};

mod admin;
mod auth;
mod config;
mod extensions;
mod healthcheck;
mod observability;
mod router;
mod shutdown;
mod state;
mod taper;
#[cfg(test)]
mod test_helpers;

/// Taper JSON API Server entry point
#[tokio::main]
pub async fn main() {
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    if let Err(init_error) = observability::init(&config) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, must use eprintln"
        )]
        {
            eprintln!("Observability error: {init_error}");
        }

        process::exit(1);
    }

    let state = match build_state(&config).await {
        Ok(state) => state,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error}");

            process::exit(1);
        }
    };

    let addr = config.socket_addr();

    info!("Starting server on {addr}");

    let listener = TcpListener::new(addr).bind().await;

    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(observability::request_logging)
        .hoop(remove_slash())
        .hoop(inject(state.into_shared()))
        .push(router::app_router());

    let doc = OpenApi::new("Taper API", env!("CARGO_PKG_VERSION"))
        .add_security_scheme(
            "signing_token",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
        .add_security_scheme(
            "admin_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                auth::admin::ADMIN_KEY_HEADER,
            ))),
        )
        .merge_router(&router);

    let router = router
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    let server = Server::new(listener);

    let handle = server.handle();
    let grace = config.server.shutdown_grace();

    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle, grace).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    server.serve(router).await;
}

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("invalid token secret: {0}")]
    TokenSecret(#[source] taper_app::domain::tokens::SigningTokenError),

    #[error(transparent)]
    App(#[from] AppInitError),
}

async fn build_state(config: &ServerConfig) -> Result<State, StartupError> {
    let settings = SigningSettings {
        token_secret: SigningTokenSecret::new(config.signing.token_secret.as_bytes())
            .map_err(StartupError::TokenSecret)?,
        upload_dir: config.signing.upload_dir.clone(),
        single_use_otp: config.signing.single_use_otp,
    };

    info!(
        upload_dir = %settings.upload_dir.display(),
        single_use_otp = settings.single_use_otp,
        "signing pipeline configured"
    );

    let app = if let Some(url) = config.database.database_url.as_deref() {
        AppContext::from_database_url(url, settings).await?
    } else {
        warn!("DATABASE_URL is not set, OTPs and the signed ledger are kept in memory");

        AppContext::in_memory(settings)
    };

    let admin_key = config.admin.admin_api_key.as_deref().and_then(AdminKey::new);

    if admin_key.is_none() {
        warn!("ADMIN_API_KEY is not set, admin endpoints will answer 503");
    }

    Ok(State::new(app, config.signing.max_upload_bytes)
        .with_admin_key(admin_key)
        .with_public_base_url(config.server.public_base_url.clone()))
}
