use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;

use crate::error::Error;
use crate::model::{Channel, GatewayBotResponse, Snowflake};

pub struct Http {
    client: reqwest::Client,
    pub base_url: String,
    token: String,
}

impl Http {
    pub fn new(token: &str, base_url: String) -> Self {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bot {}", token);
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&auth_value).unwrap());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Self {
            client: reqwest::Client::builder()
                .default_headers(headers)
                .build()
                .unwrap(),
            base_url,
            token: token.to_string(),
        }
    }

    pub fn get_token(&self) -> &str {
        &self.token
    }

    pub async fn get_gateway(&self) -> Result<String, Error> {
        let url = format!("{}/gateway/bot", self.base_url);
        let res: GatewayBotResponse = self.client.get(&url).send().await?.json().await?;
        Ok(res.url)
    }

    /// Channel lookup backing the membership resolver. A 404 maps to
    /// `Ok(None)` rather than an error.
    pub async fn get_channel(&self, channel_id: &Snowflake) -> Result<Option<Channel>, Error> {
        let url = format!("{}/channels/{}", self.base_url, channel_id);
        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!("HTTP {}: {}", status, body)));
        }

        Ok(Some(response.json().await?))
    }
}
