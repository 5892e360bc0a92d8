//! HTTP clients for the upstream player-count providers.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use metrics_core::Domain;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;

const STEAM_PLAYER_COUNT_URL: &str =
    "https://api.steampowered.com/ISteamUserStats/GetNumberOfCurrentPlayers/v1/";
const STEAM_APP_LIST_URL: &str = "https://api.steampowered.com/ISteamApps/GetAppList/v2";
const OSRS_URL: &str = "https://oldschool.runescape.com/";

const STEAM_TIMEOUT_SECS: u64 = 10;
const OSRS_TIMEOUT_SECS: u64 = 15;

/// Fetches current player counts and app catalogs from upstream providers.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Fetch the current player count for `(domain, external_id)`.
    async fn fetch(&self, domain: Domain, external_id: i64) -> Result<i64, ProviderError>;

    /// Enumerate the universe of apps per domain. Only `steam` is populated today.
    async fn fetch_catalog(&self) -> Result<HashMap<Domain, HashMap<i64, String>>, ProviderError>;
}

/// Production [`ProviderAdapter`] backed by `reqwest`.
///
/// Uses one client per upstream timeout, matching how each provider's
/// documented SLA differs (Steam's API is fast; the OSRS page is a plain
/// HTML render that runs slower under load).
pub struct HttpProviderAdapter {
    steam_client: Client,
    osrs_client: Client,
}

impl HttpProviderAdapter {
    /// # Panics
    /// Panics if either underlying HTTP client cannot be built.
    #[must_use]
    pub fn new() -> Self {
        Self {
            steam_client: Client::builder()
                .timeout(Duration::from_secs(STEAM_TIMEOUT_SECS))
                .build()
                .expect("failed to build Steam HTTP client"),
            osrs_client: Client::builder()
                .timeout(Duration::from_secs(OSRS_TIMEOUT_SECS))
                .build()
                .expect("failed to build OSRS HTTP client"),
        }
    }

    async fn fetch_steam(&self, app_id: i64) -> Result<i64, ProviderError> {
        debug!(app_id, "fetching Steam player count");

        #[derive(Deserialize)]
        struct SteamResponse {
            response: SteamPlayerCount,
        }
        #[derive(Deserialize)]
        struct SteamPlayerCount {
            player_count: i64,
        }

        let body = self
            .steam_client
            .get(STEAM_PLAYER_COUNT_URL)
            .query(&[("appid", app_id.to_string())])
            .send()
            .await?
            .text()
            .await?;

        let parsed: SteamResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))?;
        Ok(parsed.response.player_count)
    }

    async fn fetch_osrs(&self) -> Result<i64, ProviderError> {
        debug!("fetching OSRS player count");

        let body = self.osrs_client.get(OSRS_URL).send().await?.text().await?;

        let document = Html::parse_document(&body);
        let selector = Selector::parse(".player-count")
            .map_err(|e| ProviderError::Decode(format!("invalid selector: {e:?}")))?;

        let text = document
            .select(&selector)
            .next()
            .ok_or_else(|| ProviderError::Decode(".player-count node not found".to_string()))?
            .text()
            .collect::<String>();

        let words: Vec<&str> = text.split_whitespace().collect();
        let token = words
            .get(3)
            .ok_or_else(|| ProviderError::Parse(format!("expected 4+ tokens, got {text:?}")))?;

        token
            .replace(',', "")
            .parse::<i64>()
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

impl Default for HttpProviderAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderAdapter for HttpProviderAdapter {
    async fn fetch(&self, domain: Domain, external_id: i64) -> Result<i64, ProviderError> {
        match domain {
            Domain::Steam => self.fetch_steam(external_id).await,
            Domain::Osrs => self.fetch_osrs().await,
        }
    }

    async fn fetch_catalog(&self) -> Result<HashMap<Domain, HashMap<i64, String>>, ProviderError> {
        debug!("fetching Steam app list");

        #[derive(Deserialize)]
        struct AppListResponse {
            applist: AppList,
        }
        #[derive(Deserialize)]
        struct AppList {
            apps: Vec<SteamApp>,
        }
        #[derive(Deserialize)]
        struct SteamApp {
            appid: i64,
            name: String,
        }

        let body = self
            .steam_client
            .get(STEAM_APP_LIST_URL)
            .send()
            .await?
            .text()
            .await?;

        let parsed: AppListResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))?;

        let steam_apps: HashMap<i64, String> = parsed
            .applist
            .apps
            .into_iter()
            .map(|app| (app.appid, app.name))
            .collect();

        let mut catalog = HashMap::new();
        catalog.insert(Domain::Steam, steam_apps);
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn osrs_token_extraction_strips_commas() {
        let text = "There are currently 123,456 players online";
        let words: Vec<&str> = text.split_whitespace().collect();
        let token = words[3].replace(',', "");
        assert_eq!(token.parse::<i64>().unwrap(), 123_456);
    }

    #[test]
    fn osrs_selector_is_well_formed() {
        assert!(Selector::parse(".player-count").is_ok());
    }
}
