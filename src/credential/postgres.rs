// src/credential/postgres.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use super::CredentialStore;
use crate::error::DomainResult;
use crate::models::Credential;

pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn put_credential(
        &self,
        app_name: &str,
        user_id: &str,
        credential_key: &str,
        credential_data: Value,
    ) -> DomainResult<Credential> {
        let row = sqlx::query_as::<_, Credential>(
            r#"
            INSERT INTO credentials (app_name, user_id, credential_key, credential_data, updated_at)
            VALUES ($1, $2, $3, $4, now())
            ON CONFLICT (app_name, user_id, credential_key)
            DO UPDATE SET credential_data = EXCLUDED.credential_data, updated_at = now()
            RETURNING app_name, user_id, credential_key, credential_data, updated_at
            "#,
        )
        .bind(app_name)
        .bind(user_id)
        .bind(credential_key)
        .bind(credential_data)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_credential(
        &self,
        app_name: &str,
        user_id: &str,
        credential_key: &str,
    ) -> DomainResult<Option<Credential>> {
        let row = sqlx::query_as::<_, Credential>(
            r#"SELECT app_name, user_id, credential_key, credential_data, updated_at
               FROM credentials WHERE app_name = $1 AND user_id = $2 AND credential_key = $3"#,
        )
        .bind(app_name)
        .bind(user_id)
        .bind(credential_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_credential(&self, app_name: &str, user_id: &str, credential_key: &str) -> DomainResult<()> {
        sqlx::query("DELETE FROM credentials WHERE app_name = $1 AND user_id = $2 AND credential_key = $3")
            .bind(app_name)
            .bind(user_id)
            .bind(credential_key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
