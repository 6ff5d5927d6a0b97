use reqwest::Client;
use url::Url;

use foxden_core::models::WebsiteData;

use crate::endpoint;
use crate::error::{check_response, ApiError};

/// Path of the static site document.
pub const SITE_DATA_PATH: &str = "data.json";

/// Reads the static site document (profile, anime and gaming stats).
pub struct SiteClient {
    url: Url,
    http: Client,
}

impl SiteClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            url: endpoint(base_url, SITE_DATA_PATH)?,
            http: Client::new(),
        })
    }

    pub async fn fetch(&self) -> Result<WebsiteData, ApiError> {
        let resp = self.http.get(self.url.clone()).send().await?;
        let resp = check_response(resp).await?;
        resp.json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}
