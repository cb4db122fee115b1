//! # Application State
//!
//! Shared across handlers via Axum's `State` extractor. Holds no mutable
//! data of its own; the store owns persistence.

use std::sync::Arc;

use atl_crypto::{CredentialHasher, CryptoError, KdfParams};

use crate::config::AppConfig;
use crate::store::{MemoryStore, TranslationStore};

/// Handler state.
#[derive(Clone)]
pub struct AppState {
    /// Credential and address persistence.
    pub store: Arc<dyn TranslationStore>,
    /// Verifies tenant credentials.
    pub hasher: Arc<CredentialHasher>,
    /// Service configuration.
    pub config: Arc<AppConfig>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("hasher", &self.hasher)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Build state over `store`. Computes the hasher's sentinel hash.
    pub fn new(store: Arc<dyn TranslationStore>, config: AppConfig) -> Result<Self, CryptoError> {
        let pepper = config.pepper.as_ref().map(|p| p.to_vec());
        let hasher = CredentialHasher::new(config.hash, pepper)?;
        Ok(Self {
            store,
            hasher: Arc::new(hasher),
            config: Arc::new(config),
        })
    }

    /// State over a fresh [`MemoryStore`].
    pub fn in_memory(config: AppConfig) -> Result<Self, CryptoError> {
        Self::new(Arc::new(MemoryStore::new()), config)
    }

    /// Envelope key derivation parameters.
    pub fn kdf(&self) -> KdfParams {
        self.config.kdf
    }
}
