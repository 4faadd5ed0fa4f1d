// src/factories/mod.rs
// Service factories (spec §4.7): one memoized singleton per backend-selected
// service, explicit overrides bypass the cache, `reset_*` is test-only.
// Grounded on original_source/.../factories/artifacts.py's backend-strategy
// shape, generalized from a single enum-keyed map to one OnceLock per service.

use std::sync::{Arc, OnceLock, RwLock};

use sqlx::PgPool;

use crate::artifact::{ArtifactStore, InMemoryArtifactStore};
use crate::config::services::Backend;
use crate::credential::{CredentialStore, PostgresCredentialStore};
use crate::error::{DomainError, DomainResult};
use crate::fact::{FactStore, PostgresFactStore};
use crate::memory::{MemoryStore, PostgresMemoryStore};
use crate::session::postgres::PostgresSessionStore;
use crate::session::{SessionStore, TempCache, TitleSummarizer};

macro_rules! singleton_cell {
    ($name:ident, $trait_obj:ty) => {
        static $name: OnceLock<RwLock<Option<Arc<$trait_obj>>>> = OnceLock::new();

        fn cell_of(_marker: &'static str) -> &'static RwLock<Option<Arc<$trait_obj>>> {
            $name.get_or_init(|| RwLock::new(None))
        }
    };
}

mod session_cell {
    use super::*;
    singleton_cell!(SESSION_STORE, dyn SessionStore);
}

mod memory_cell {
    use super::*;
    singleton_cell!(MEMORY_STORE, dyn MemoryStore);
}

mod fact_cell {
    use super::*;
    singleton_cell!(FACT_STORE, dyn FactStore);
}

mod credential_cell {
    use super::*;
    singleton_cell!(CREDENTIAL_STORE, dyn CredentialStore);
}

mod artifact_cell {
    use super::*;
    singleton_cell!(ARTIFACT_STORE, dyn ArtifactStore);
}

/// Builds (or returns the memoized) `SessionStore` for `backend`. An explicit
/// `backend` argument is never cached; `None` reads `ServicesConfig` and uses
/// the process-wide singleton.
pub fn session_store(
    pool: &PgPool,
    temp_cache: Arc<TempCache>,
    title_summarizer: Arc<dyn TitleSummarizer>,
    backend: Option<Backend>,
) -> DomainResult<Arc<dyn SessionStore>> {
    let build = |backend: Backend| -> DomainResult<Arc<dyn SessionStore>> {
        match backend {
            Backend::Database => Ok(Arc::new(PostgresSessionStore::new(
                pool.clone(),
                temp_cache.clone(),
                title_summarizer.clone(),
            ))),
            other => Err(DomainError::InfrastructureError(format!("unsupported session backend: {other:?}"))),
        }
    };

    match backend {
        Some(explicit) => build(explicit),
        None => {
            let cell = session_cell::cell_of("session");
            if let Some(existing) = cell.read().unwrap().as_ref() {
                return Ok(existing.clone());
            }
            let instance = build(crate::config::CONFIG.services.session_backend)?;
            *cell.write().unwrap() = Some(instance.clone());
            Ok(instance)
        }
    }
}

pub fn memory_store(pool: &PgPool, backend: Option<Backend>) -> DomainResult<Arc<dyn MemoryStore>> {
    let build = |backend: Backend| -> DomainResult<Arc<dyn MemoryStore>> {
        match backend {
            Backend::Database => Ok(Arc::new(PostgresMemoryStore::new(pool.clone()))),
            other => Err(DomainError::InfrastructureError(format!("unsupported memory backend: {other:?}"))),
        }
    };

    match backend {
        Some(explicit) => build(explicit),
        None => {
            let cell = memory_cell::cell_of("memory");
            if let Some(existing) = cell.read().unwrap().as_ref() {
                return Ok(existing.clone());
            }
            let instance = build(crate::config::CONFIG.services.memory_backend)?;
            *cell.write().unwrap() = Some(instance.clone());
            Ok(instance)
        }
    }
}

pub fn fact_store(pool: &PgPool) -> Arc<dyn FactStore> {
    let cell = fact_cell::cell_of("fact");
    if let Some(existing) = cell.read().unwrap().as_ref() {
        return existing.clone();
    }
    let instance: Arc<dyn FactStore> = Arc::new(PostgresFactStore::new(pool.clone()));
    *cell.write().unwrap() = Some(instance.clone());
    instance
}

pub fn credential_store(pool: &PgPool, backend: Option<Backend>) -> DomainResult<Arc<dyn CredentialStore>> {
    let build = |backend: Backend| -> DomainResult<Arc<dyn CredentialStore>> {
        match backend {
            Backend::Database => Ok(Arc::new(PostgresCredentialStore::new(pool.clone()))),
            other => Err(DomainError::InfrastructureError(format!("unsupported credential backend: {other:?}"))),
        }
    };

    match backend {
        Some(explicit) => build(explicit),
        None => {
            let cell = credential_cell::cell_of("credential");
            if let Some(existing) = cell.read().unwrap().as_ref() {
                return Ok(existing.clone());
            }
            let instance = build(crate::config::CONFIG.services.credential_backend)?;
            *cell.write().unwrap() = Some(instance.clone());
            Ok(instance)
        }
    }
}

pub fn artifact_store(backend: Option<Backend>) -> DomainResult<Arc<dyn ArtifactStore>> {
    let build = |backend: Backend| -> DomainResult<Arc<dyn ArtifactStore>> {
        match backend {
            Backend::Memory => Ok(Arc::new(InMemoryArtifactStore::new())),
            other => Err(DomainError::InfrastructureError(format!("unsupported artifact backend: {other:?}"))),
        }
    };

    match backend {
        Some(explicit) => build(explicit),
        None => {
            let cell = artifact_cell::cell_of("artifact");
            if let Some(existing) = cell.read().unwrap().as_ref() {
                return Ok(existing.clone());
            }
            let instance = build(crate::config::CONFIG.services.artifact_backend)?;
            *cell.write().unwrap() = Some(instance.clone());
            Ok(instance)
        }
    }
}

/// Test-only: clears every memoized singleton.
pub fn reset_all() {
    *session_cell::cell_of("session").write().unwrap() = None;
    *memory_cell::cell_of("memory").write().unwrap() = None;
    *fact_cell::cell_of("fact").write().unwrap() = None;
    *credential_cell::cell_of("credential").write().unwrap() = None;
    *artifact_cell::cell_of("artifact").write().unwrap() = None;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_store_memoizes_across_calls() {
        reset_all();
        let a = artifact_store(Some(Backend::Memory)).unwrap();
        let b = artifact_store(Some(Backend::Memory)).unwrap();
        // explicit-backend calls are never cached: two distinct instances.
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn unsupported_backend_surfaces_infrastructure_error() {
        let err = artifact_store(Some(Backend::Database)).unwrap_err();
        assert_eq!(err.code(), "INFRASTRUCTURE_ERROR");
    }
}
