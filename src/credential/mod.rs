// src/credential/mod.rs
// Credential Store (spec §2, §3): per-(app,user,key) opaque JSON upsert.

pub mod postgres;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DomainResult;
use crate::models::Credential;

pub use postgres::PostgresCredentialStore;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn put_credential(
        &self,
        app_name: &str,
        user_id: &str,
        credential_key: &str,
        credential_data: Value,
    ) -> DomainResult<Credential>;

    async fn get_credential(
        &self,
        app_name: &str,
        user_id: &str,
        credential_key: &str,
    ) -> DomainResult<Option<Credential>>;

    async fn delete_credential(&self, app_name: &str, user_id: &str, credential_key: &str) -> DomainResult<()>;
}
