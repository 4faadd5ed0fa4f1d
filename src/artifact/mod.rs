// src/artifact/mod.rs
// Artifact Store (spec §2): pluggable blob store for opaque binary artifacts.
// Grounded on original_source/.../factories/artifacts.py's backend-strategy
// shape (inmemory vs. object-store), adapted to a trait + impl instead of a
// string-keyed factory map (that composition lives in `factories`).

pub mod memory;

use async_trait::async_trait;

use crate::error::DomainResult;
use crate::models::Artifact;

pub use memory::InMemoryArtifactStore;

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn put_artifact(
        &self,
        app_name: &str,
        user_id: &str,
        artifact_key: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> DomainResult<Artifact>;

    async fn get_artifact(&self, app_name: &str, user_id: &str, artifact_key: &str) -> DomainResult<Option<Artifact>>;

    async fn list_artifact_keys(&self, app_name: &str, user_id: &str) -> DomainResult<Vec<String>>;

    async fn delete_artifact(&self, app_name: &str, user_id: &str, artifact_key: &str) -> DomainResult<()>;
}
