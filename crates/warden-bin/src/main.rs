// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Warden - authentication and authorization service
//!
//! Main binary entry point. Loads configuration, initializes logging, wires
//! the application state, and runs the API server until SIGINT.
//!
//! An initial account can be seeded through the environment
//! (`WARDEN_BOOTSTRAP_IDENTITY` / `WARDEN_BOOTSTRAP_PASSWORD`); it is created
//! as a superadmin with user ID 1. Without it, the demo in-memory store
//! starts empty and every login fails until a store collaborator is wired in.

mod cli;
mod logging;

use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use warden_api::{ApiConfig, ApiServer, AppState};
use warden_core::{
    Argon2Securer, AuthError, AuthResult, InMemoryCredentialStore, PasswordSecurer, Role,
    StoredCredential,
};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(&cli.config).await,
        Commands::Validate => validate(&cli.config),
        Commands::Version => {
            println!("warden v{}", warden_core::VERSION);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Loads configuration, applying environment overrides.
///
/// A missing config file is not fatal: defaults plus environment are enough
/// for a development run.
fn load_config(path: &std::path::Path) -> AuthResult<ApiConfig> {
    if path.exists() {
        ApiConfig::from_file(path)
    } else {
        warn!(path = %path.display(), "Config file not found, using defaults");
        let mut config = ApiConfig::default();
        config.apply_env();
        Ok(config)
    }
}

/// Runs the service.
async fn run(config_path: &std::path::Path) -> AuthResult<()> {
    let config = load_config(config_path)?;
    config.validate()?;

    let securer = Arc::new(Argon2Securer::new(config.min_password_length));
    let store = Arc::new(InMemoryCredentialStore::new());
    seed_bootstrap_account(&store, securer.as_ref()).await?;

    let state = AppState::builder()
        .config(config)
        .credential_store(store)
        .securer(securer)
        .build()
        .map_err(|e| AuthError::internal(e.to_string()))?;

    info!("Warden v{} starting", warden_core::VERSION);

    ApiServer::new(state)
        .run_with_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .map_err(|e| AuthError::internal(e.to_string()))
}

/// Validates the configuration file and exits.
fn validate(config_path: &std::path::Path) -> AuthResult<()> {
    let config = ApiConfig::from_file(config_path)?;
    config.validate()?;
    println!("Configuration OK: {}", config_path.display());
    Ok(())
}

/// Seeds the bootstrap superadmin account from the environment, if set.
async fn seed_bootstrap_account(
    store: &InMemoryCredentialStore,
    securer: &dyn PasswordSecurer,
) -> AuthResult<()> {
    let (Ok(identity), Ok(password)) = (
        std::env::var("WARDEN_BOOTSTRAP_IDENTITY"),
        std::env::var("WARDEN_BOOTSTRAP_PASSWORD"),
    ) else {
        return Ok(());
    };

    if !securer.validate_strength(&password) {
        return Err(AuthError::invalid_input(format!(
            "Bootstrap password must be at least {} characters",
            securer.min_password_length()
        )));
    }

    let hash = securer.hash(&password)?;
    store
        .insert(StoredCredential::new(1, identity.clone(), hash, Role::Superadmin))
        .await;

    info!(identity, "Bootstrap superadmin account seeded");
    Ok(())
}
