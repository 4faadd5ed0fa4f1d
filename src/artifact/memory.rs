// src/artifact/memory.rs
// Development/test backend: holds artifacts in process memory only.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::ArtifactStore;
use crate::error::DomainResult;
use crate::models::Artifact;

#[derive(Default)]
pub struct InMemoryArtifactStore {
    data: RwLock<HashMap<(String, String, String), Artifact>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn put_artifact(
        &self,
        app_name: &str,
        user_id: &str,
        artifact_key: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> DomainResult<Artifact> {
        let artifact = Artifact {
            app_name: app_name.to_string(),
            user_id: user_id.to_string(),
            artifact_key: artifact_key.to_string(),
            content_type: content_type.to_string(),
            data,
            updated_at: Utc::now(),
        };
        self.data.write().insert(
            (app_name.to_string(), user_id.to_string(), artifact_key.to_string()),
            artifact.clone(),
        );
        Ok(artifact)
    }

    async fn get_artifact(&self, app_name: &str, user_id: &str, artifact_key: &str) -> DomainResult<Option<Artifact>> {
        let key = (app_name.to_string(), user_id.to_string(), artifact_key.to_string());
        Ok(self.data.read().get(&key).cloned())
    }

    async fn list_artifact_keys(&self, app_name: &str, user_id: &str) -> DomainResult<Vec<String>> {
        let keys = self
            .data
            .read()
            .keys()
            .filter(|(app, user, _)| app == app_name && user == user_id)
            .map(|(_, _, key)| key.clone())
            .collect();
        Ok(keys)
    }

    async fn delete_artifact(&self, app_name: &str, user_id: &str, artifact_key: &str) -> DomainResult<()> {
        let key = (app_name.to_string(), user_id.to_string(), artifact_key.to_string());
        self.data.write().remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = InMemoryArtifactStore::new();
        store
            .put_artifact("app", "u1", "k1", "text/plain", b"hello".to_vec())
            .await
            .unwrap();
        let found = store.get_artifact("app", "u1", "k1").await.unwrap().unwrap();
        assert_eq!(found.data, b"hello");
    }

    #[tokio::test]
    async fn list_artifact_keys_scopes_by_app_and_user() {
        let store = InMemoryArtifactStore::new();
        store.put_artifact("app", "u1", "a", "text/plain", vec![]).await.unwrap();
        store.put_artifact("app", "u2", "b", "text/plain", vec![]).await.unwrap();
        let keys = store.list_artifact_keys("app", "u1").await.unwrap();
        assert_eq!(keys, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn delete_removes_artifact() {
        let store = InMemoryArtifactStore::new();
        store.put_artifact("app", "u1", "a", "text/plain", vec![]).await.unwrap();
        store.delete_artifact("app", "u1", "a").await.unwrap();
        assert!(store.get_artifact("app", "u1", "a").await.unwrap().is_none());
    }
}
