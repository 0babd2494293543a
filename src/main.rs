// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{error::Error, net::SocketAddr, sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mini_messenger_server::{
    api::router,
    auth::NonceSigner,
    blockchain::{ChainError, ChainMirror},
    config::{AppConfig, LogFormat, DEFAULT_LOG_FILTER},
    state::AppState,
    storage::{Persistence, PostgrestClient},
    store::LocalStore,
};

type BoxError = Box<dyn Error + Send + Sync>;

/// Grace period for in-flight requests after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(config.log_format);

    if let Err(e) = run(config).await {
        error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn run(config: AppConfig) -> Result<(), BoxError> {
    let addr: SocketAddr = config.bind_address().parse()?;
    let state = build_state(&config)?;
    let app = router(state);

    let handle = Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, draining connections");
        shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
    });

    match &config.tls {
        Some(tls) => {
            // Install the ring crypto provider for rustls before any TLS work
            let _ = rustls::crypto::ring::default_provider().install_default();
            let tls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;

            info!(%addr, "Mini Messenger listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            info!(%addr, "Mini Messenger listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    info!("Server stopped");
    Ok(())
}

fn build_state(config: &AppConfig) -> Result<AppState, BoxError> {
    let mut persistence =
        Persistence::new(LocalStore::new()).with_fallback(config.local_fallback);

    match &config.managed_store {
        Some(managed) => {
            let client =
                PostgrestClient::new(&managed.project_url, managed.api_key.clone(), managed.timeout)?;
            info!(
                url = %managed.project_url,
                local_fallback = config.local_fallback,
                "Managed store configured"
            );
            persistence = persistence.with_managed(Arc::new(client));
        }
        None => info!("No managed store configured, using local store only"),
    }

    let mut state = AppState::new(persistence).with_auth_config(config.auth.clone());

    if config.auth.session_secret.is_none() {
        warn!("AUTH_SECRET not set: session signatures are NOT verified (development mode)");
    }

    match config.hmac_secret.as_deref().map(|secret| NonceSigner::new(secret)) {
        Some(signer) => state = state.with_nonce_signer(signer?),
        None => warn!("HMAC_SECRET_KEY not set: /api/nonce will answer 500"),
    }

    if let Some(chain) = &config.chain {
        match ChainMirror::new(chain.network.clone(), &chain.rpc_url, &chain.contract_address) {
            Ok(mirror) => {
                info!(
                    network = chain.network.name,
                    chain_id = chain.network.chain_id,
                    contract = %mirror.contract_address(),
                    "Chain messaging enabled"
                );
                state = state.with_chain(mirror);
            }
            Err(ChainError::ContractNotConfigured) => {
                warn!("Chain messaging enabled but no contract address configured; chain routes answer 503");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
