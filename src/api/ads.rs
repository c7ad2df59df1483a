// SPDX-License-Identifier: MPL-2.0

use super::{AdsError, AdsResult, OptionSource, ParentNode};
use crate::widgets::cascade::{OptionId, OptionItem};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Body of every option-list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsResponse {
    pub items: Vec<OptionItem>,
}

/// Body of the category property endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HtmlResponse {
    #[serde(default)]
    pub html: String,
}

/// HTTP client for the ad form's ajax endpoints.
#[derive(Debug, Clone)]
pub struct AdsClient {
    client: reqwest::Client,
    base_url: String,
}

impl AdsClient {
    /// Create a new client rooted at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> AdsResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdsError::ConnectionFailed(e.to_string()))?;

        // Normalize base URL (remove trailing slash)
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn ajax_prefix(&self) -> String {
        format!("{}/ads/ajax", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> AdsResult<T> {
        tracing::debug!(url, "GET");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| AdsError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AdsError::RequestFailed(format!(
                "Server returned status: {} - {}",
                status, body
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AdsError::InvalidResponse(e.to_string()))
    }

    /// Top-level categories for the synthetic root, children otherwise
    pub async fn category_children(&self, parent: ParentNode) -> AdsResult<Vec<OptionItem>> {
        let url = format!("{}/category_children/{}/", self.ajax_prefix(), parent.raw());
        let body: ItemsResponse = self.get_json(&url, &[]).await?;
        Ok(body.items)
    }

    /// Property form fragment for a leaf category
    pub async fn category_properties(
        &self,
        category: OptionId,
        ad: Option<u64>,
    ) -> AdsResult<String> {
        let url = format!("{}/load-category-properties/", self.ajax_prefix());
        let query = [
            ("category_id", category.to_string()),
            ("ad_id", ad.map(|id| id.to_string()).unwrap_or_default()),
        ];
        let body: HtmlResponse = self.get_json(&url, &query).await?;
        Ok(body.html)
    }

    /// Root locations
    pub async fn locations(&self) -> AdsResult<Vec<OptionItem>> {
        let url = format!("{}/locations/", self.ajax_prefix());
        let body: ItemsResponse = self.get_json(&url, &[]).await?;
        Ok(body.items)
    }

    /// Cities of a location
    pub async fn cities(&self, location: OptionId) -> AdsResult<Vec<OptionItem>> {
        let url = format!("{}/cities/{}/", self.ajax_prefix(), location);
        let body: ItemsResponse = self.get_json(&url, &[]).await?;
        Ok(body.items)
    }

    /// Neighbourhoods of a city
    pub async fn neighbourhoods(&self, city: OptionId) -> AdsResult<Vec<OptionItem>> {
        let url = format!("{}/neighbourhoods/{}/", self.ajax_prefix(), city);
        let body: ItemsResponse = self.get_json(&url, &[]).await?;
        Ok(body.items)
    }
}

#[async_trait]
impl OptionSource for AdsClient {
    async fn category_children(&self, parent: ParentNode) -> AdsResult<Vec<OptionItem>> {
        AdsClient::category_children(self, parent).await
    }

    async fn category_properties(&self, category: OptionId, ad: Option<u64>) -> AdsResult<String> {
        AdsClient::category_properties(self, category, ad).await
    }

    async fn locations(&self) -> AdsResult<Vec<OptionItem>> {
        AdsClient::locations(self).await
    }

    async fn cities(&self, location: OptionId) -> AdsResult<Vec<OptionItem>> {
        AdsClient::cities(self, location).await
    }

    async fn neighbourhoods(&self, city: OptionId) -> AdsResult<Vec<OptionItem>> {
        AdsClient::neighbourhoods(self, city).await
    }
}
