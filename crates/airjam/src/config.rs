//! Process configuration and the startup auth-mode decision.

use airjam_auth::{ApiKeyVerifier, AuthError, DevVerifier, MasterKeyVerifier, StoreVerifier};

use crate::AppError;

const DEFAULT_PORT: u16 = 4000;

/// Configuration loaded once from the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub master_key: Option<String>,
    pub database_url: Option<String>,
}

impl Config {
    /// Reads `PORT`, `AIR_JAM_MASTER_KEY`, and `DATABASE_URL` from the
    /// environment. `RUST_LOG` is consumed directly by `tracing_subscriber`
    /// and isn't part of this struct.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let master_key = std::env::var("AIR_JAM_MASTER_KEY").ok().filter(|s| !s.is_empty());
        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        Self { port, master_key, database_url }
    }

    /// Resolves the auth mode per §4.2: store mode (if `DATABASE_URL` is
    /// set) takes precedence over master-key mode, which takes precedence
    /// over dev mode. Logs the chosen mode without leaking the secret.
    pub async fn build_verifier(&self) -> Result<AuthMode, AppError> {
        if let Some(database_url) = &self.database_url {
            let verifier = StoreVerifier::connect(database_url).await?;
            tracing::info!("auth mode: store");
            return Ok(AuthMode::Store(verifier));
        }
        if let Some(master_key) = &self.master_key {
            tracing::info!("auth mode: master-key");
            return Ok(AuthMode::MasterKey(MasterKeyVerifier::new(master_key.clone())));
        }
        tracing::info!("auth mode: dev (no AIR_JAM_MASTER_KEY or DATABASE_URL set — every api key is accepted)");
        Ok(AuthMode::Dev(DevVerifier))
    }
}

/// The runtime auth verifier, one of the three modes decided once at
/// startup by [`Config::build_verifier`].
#[derive(Clone)]
pub enum AuthMode {
    Dev(DevVerifier),
    MasterKey(MasterKeyVerifier),
    Store(StoreVerifier),
}

impl ApiKeyVerifier for AuthMode {
    async fn verify(&self, key: &str) -> Result<(), AuthError> {
        match self {
            AuthMode::Dev(v) => v.verify(key).await,
            AuthMode::MasterKey(v) => v.verify(key).await,
            AuthMode::Store(v) => v.verify(key).await,
        }
    }
}
