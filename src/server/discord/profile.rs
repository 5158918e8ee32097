//! Character page scraper used as the external `ProfileLookup`.

use regex::Regex;
use reqwest::StatusCode;
use serenity::async_trait;
use url::{form_urlencoded, Url};

use crate::server::{
    error::{internal::InternalError, lookup::LookupError},
    model::verification::ExternalProfile,
    port::ProfileLookup,
};

/// Extracts the character id and guild from a character page.
pub struct ProfilePage {
    character_id: Regex,
    guild: Regex,
}

impl ProfilePage {
    pub fn new() -> Result<Self, InternalError> {
        Ok(Self {
            character_id: Regex::new(r"var\s+ccid\s*=\s*(\d+)\s*;")?,
            guild: Regex::new(r"&amp;guild=([^&]+)")?,
        })
    }

    /// `None` when the page has no character id, which is how unknown names render.
    pub fn parse(&self, html: &str) -> Option<ExternalProfile> {
        let external_id = self.character_id.captures(html)?.get(1)?.as_str().to_string();
        let guild = self
            .guild
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| decode_guild(m.as_str()))
            .filter(|guild| !guild.is_empty());

        Some(ExternalProfile { external_id, guild })
    }
}

/// Decodes the `guild` query value as it appears in the page's links.
fn decode_guild(raw: &str) -> String {
    form_urlencoded::parse(format!("guild={}", raw).as_bytes())
        .find(|(key, _)| key == "guild")
        .map(|(_, value)| value.trim().to_string())
        .unwrap_or_default()
}

/// Fetches character pages over HTTP. Rate limiting is reported, not retried; wrap in
/// `RetryingLookup` for that.
pub struct HttpProfileLookup {
    client: reqwest::Client,
    base_url: Url,
    page: ProfilePage,
}

impl HttpProfileLookup {
    pub fn new(client: reqwest::Client, base_url: Url) -> Result<Self, InternalError> {
        Ok(Self {
            client,
            base_url,
            page: ProfilePage::new()?,
        })
    }

    /// Character page of `username`, passed as the `id` query parameter.
    fn page_url(&self, username: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("id", username);
        url
    }
}

#[async_trait]
impl ProfileLookup for HttpProfileLookup {
    async fn fetch_profile(&self, username: &str) -> Result<Option<ExternalProfile>, LookupError> {
        let url = self.page_url(username);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| LookupError::Failed(e.to_string()))?;

        let status = response.status();
        tracing::debug!("{} : {}", url, status);

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LookupError::RateLimited);
        }
        if status != StatusCode::OK {
            return Ok(None);
        }

        let html = response
            .text()
            .await
            .map_err(|e| LookupError::Failed(e.to_string()))?;

        Ok(self.page.parse(&html))
    }
}
