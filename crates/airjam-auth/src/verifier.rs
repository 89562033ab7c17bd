//! API-key verification: resolves an API key to valid/invalid, in one of
//! three modes chosen once at startup.
//!
//! # Why a trait?
//!
//! The router only needs one operation — "is this key good?" — and the
//! answer comes from wildly different places depending on deployment (no
//! check at all in dev, a single shared secret, or a real credential
//! store). A trait lets `airjam`'s bootstrap pick one implementation
//! without the router needing to know which.

use crate::AuthError;

/// Resolves an API key to "valid" or "invalid".
///
/// A pure read-through: no caching is required, and implementations that
/// do cache must not cache negative results beyond the request that
/// produced them (a key revoked mid-flight must fail on the next check).
pub trait ApiKeyVerifier: Send + Sync + 'static {
    /// Checks whether `key` is currently valid.
    fn verify(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), AuthError>> + Send;
}

/// Dev mode: every key, including the empty string, verifies.
///
/// Selected when neither `AIR_JAM_MASTER_KEY` nor `DATABASE_URL` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DevVerifier;

impl ApiKeyVerifier for DevVerifier {
    async fn verify(&self, _key: &str) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Master-key mode: a single shared secret must match exactly.
///
/// Selected when `AIR_JAM_MASTER_KEY` is set (and `DATABASE_URL` is not;
/// store mode takes precedence if both are configured, since it's the
/// more specific credential source).
#[derive(Debug, Clone)]
pub struct MasterKeyVerifier {
    master_key: String,
}

impl MasterKeyVerifier {
    pub fn new(master_key: impl Into<String>) -> Self {
        Self {
            master_key: master_key.into(),
        }
    }
}

impl ApiKeyVerifier for MasterKeyVerifier {
    async fn verify(&self, key: &str) -> Result<(), AuthError> {
        if key == self.master_key {
            Ok(())
        } else {
            Err(AuthError::InvalidApiKey)
        }
    }
}

/// Store mode: looks up an active `(key, is_active = true)` row in the
/// `api_keys` table. On a hit, fires off a best-effort `last_used_at`
/// update (its failure is logged, never surfaced to the caller).
#[cfg(feature = "store")]
#[derive(Clone)]
pub struct StoreVerifier {
    pool: sqlx::PgPool,
}

#[cfg(feature = "store")]
impl StoreVerifier {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = sqlx::PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[cfg(feature = "store")]
impl ApiKeyVerifier for StoreVerifier {
    async fn verify(&self, key: &str) -> Result<(), AuthError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM api_keys WHERE key = $1 AND is_active = true",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "api key store lookup failed");
            AuthError::InvalidApiKey
        })?;

        let Some((id,)) = row else {
            return Err(AuthError::InvalidApiKey);
        };

        let pool = self.pool.clone();
        tokio::spawn(async move {
            if let Err(e) =
                sqlx::query("UPDATE api_keys SET last_used_at = now() WHERE id = $1")
                    .bind(id)
                    .execute(&pool)
                    .await
            {
                tracing::warn!(error = %e, "failed to record api key last_used_at");
            }
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dev_verifier_accepts_anything() {
        let verifier = DevVerifier;
        assert!(verifier.verify("").await.is_ok());
        assert!(verifier.verify("whatever").await.is_ok());
    }

    #[tokio::test]
    async fn master_key_verifier_requires_exact_match() {
        let verifier = MasterKeyVerifier::new("top-secret");
        assert!(verifier.verify("top-secret").await.is_ok());
        assert!(matches!(
            verifier.verify("wrong").await,
            Err(AuthError::InvalidApiKey)
        ));
        assert!(matches!(
            verifier.verify("").await,
            Err(AuthError::InvalidApiKey)
        ));
    }
}
