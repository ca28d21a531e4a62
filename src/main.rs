// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account Portal API Server
//!
//! Serves the sign-in, sign-up, password reset and dashboard pages backed
//! by the Firebase identity backend and Firestore user profiles.

use account_portal::{
    config::{Config, ProfileBackend},
    db::{FirestoreDb, MemoryProfileStore, ProfileStore},
    services::{IdentityProvider, IdentityToolkitClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Account Portal");

    // Profile store
    let profiles: Arc<dyn ProfileStore> = match config.profile_backend {
        ProfileBackend::Firestore => Arc::new(FirestoreDb::new(&config.gcp_project_id).await?),
        ProfileBackend::Memory => {
            tracing::warn!("Using in-memory profile store; profiles are lost on restart");
            Arc::new(MemoryProfileStore::new())
        }
    };

    // Identity backend
    let auth: Arc<dyn IdentityProvider> = match &config.auth_emulator_host {
        Some(host) => Arc::new(IdentityToolkitClient::for_emulator(
            host,
            config.firebase_api_key.clone(),
            config.public_url.clone(),
        )),
        None => Arc::new(IdentityToolkitClient::new(
            config.firebase_api_key.clone(),
            config.public_url.clone(),
        )),
    };

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), auth, profiles));

    // Build router
    let app = account_portal::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, static_dir = %config.static_dir, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("account_portal=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
