//! WordPress/BuddyPress REST client
//!
//! Activity pages come from the stock BuddyPress activity controller; the
//! moderation lists live in the reading platform's own `shelf/v1` plugin
//! namespace.

use std::collections::HashSet;

use reqwest::Client;
use serde_json::Value;

use crate::decode::lenient_i64;
use crate::error::FeedError;

use super::FeedApi;

/// REST client for a BuddyPress-backed reading platform
pub struct BuddyPressClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl BuddyPressClient {
    /// Create a new client for the given site
    pub fn new(base_url: &str, access_token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }

    /// Create a client with an explicit request timeout
    pub fn with_timeout(
        base_url: &str,
        access_token: &str,
        timeout: std::time::Duration,
    ) -> Result<Self, FeedError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }

    /// Build a REST API URL
    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/wp-json{}", self.base_url, endpoint)
    }

    async fn get_json(&self, url: &str) -> Result<Value, FeedError> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Http { status, body });
        }

        Ok(response.json().await?)
    }

    async fn post_empty(&self, url: &str) -> Result<(), FeedError> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Http { status, body });
        }

        Ok(())
    }

    async fn delete_empty(&self, url: &str) -> Result<(), FeedError> {
        let response = self
            .client
            .delete(url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Http { status, body });
        }

        Ok(())
    }

    /// Fetch one moderation id list; ids may arrive as numbers or strings
    async fn fetch_id_list(&self, endpoint: &str) -> Result<HashSet<i64>, FeedError> {
        let body = self.get_json(&self.api_url(endpoint)).await?;
        let Value::Array(entries) = body else {
            return Err(FeedError::Payload(format!(
                "expected a JSON array from {endpoint}"
            )));
        };
        Ok(entries.iter().filter_map(lenient_i64).collect())
    }
}

impl FeedApi for BuddyPressClient {
    async fn fetch_page(&self, page: u32, per_page: usize) -> Result<Vec<Value>, FeedError> {
        let url = self.api_url(&format!(
            "/buddypress/v1/activity?page={page}&per_page={per_page}"
        ));
        let body = self.get_json(&url).await?;
        match body {
            Value::Array(entries) => Ok(entries),
            other => Err(FeedError::Payload(format!(
                "expected a JSON array of activities, got {other}"
            ))),
        }
    }

    async fn fetch_blocked_ids(&self) -> Result<HashSet<i64>, FeedError> {
        self.fetch_id_list("/shelf/v1/moderation/blocked").await
    }

    async fn fetch_muted_ids(&self) -> Result<HashSet<i64>, FeedError> {
        self.fetch_id_list("/shelf/v1/moderation/muted").await
    }

    async fn block(&self, user_id: i64) -> Result<(), FeedError> {
        self.post_empty(&self.api_url(&format!("/shelf/v1/moderation/blocked/{user_id}")))
            .await
    }

    async fn unblock(&self, user_id: i64) -> Result<(), FeedError> {
        self.delete_empty(&self.api_url(&format!("/shelf/v1/moderation/blocked/{user_id}")))
            .await
    }

    async fn mute(&self, user_id: i64) -> Result<(), FeedError> {
        self.post_empty(&self.api_url(&format!("/shelf/v1/moderation/muted/{user_id}")))
            .await
    }

    async fn unmute(&self, user_id: i64) -> Result<(), FeedError> {
        self.delete_empty(&self.api_url(&format!("/shelf/v1/moderation/muted/{user_id}")))
            .await
    }
}
