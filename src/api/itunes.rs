use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url, header};
use serde::Deserialize;
use thiserror::Error;

use crate::config::AppConfig;
use crate::models::SearchResult;

#[derive(Debug, Error)]
pub enum ItunesError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("search endpoint returned status {0}")]
    Status(u16),
    #[error("failed to parse response: {0}")]
    Parse(String),
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
}

/// Sub-category filter understood by the provider's `entity` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Album,
    Song,
}

impl Entity {
    pub fn as_str(self) -> &'static str {
        match self {
            Entity::Album => "album",
            Entity::Song => "song",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRequest {
    /// Free-text catalog search.
    Term {
        term: String,
        entity: Option<Entity>,
    },
    /// Items belonging to one artist, restricted to an entity type.
    Artist { artist_id: String, entity: Entity },
}

impl SearchRequest {
    pub fn label(&self) -> &str {
        match self {
            SearchRequest::Term { term, .. } => term,
            SearchRequest::Artist { artist_id, .. } => artist_id,
        }
    }
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn fetch(&self, request: &SearchRequest) -> Result<Vec<SearchResult>, ItunesError>;
}

#[derive(Clone)]
pub struct ItunesClient {
    http: Client,
    api_root: String,
    lookup_root: String,
    media: String,
    limit: String,
}

impl ItunesClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            "X-Client-Id",
            header::HeaderValue::from_str(config.client_id())
                .context("invalid client identifier header value")?,
        );

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent())
            .connect_timeout(config.connect_timeout())
            .build()
            .context("unable to construct http client")?;

        Ok(Self {
            http,
            api_root: config.api_root().to_string(),
            lookup_root: config.lookup_root().to_string(),
            media: config.media().to_string(),
            limit: config.result_limit().to_string(),
        })
    }

    pub fn request_url(&self, request: &SearchRequest) -> Result<Url, ItunesError> {
        let parsed = match request {
            SearchRequest::Term { term, entity } => {
                let mut params = vec![("term", term.as_str()), ("media", self.media.as_str())];
                if let Some(entity) = entity {
                    params.push(("entity", entity.as_str()));
                }
                params.push(("limit", self.limit.as_str()));
                Url::parse_with_params(&self.api_root, params)
            }
            SearchRequest::Artist { artist_id, entity } => Url::parse_with_params(
                &self.lookup_root,
                [
                    ("id", artist_id.as_str()),
                    ("entity", entity.as_str()),
                    ("limit", self.limit.as_str()),
                ],
            ),
        };
        parsed.map_err(|err| ItunesError::InvalidUrl(err.to_string()))
    }
}

#[async_trait]
impl SearchBackend for ItunesClient {
    async fn fetch(&self, request: &SearchRequest) -> Result<Vec<SearchResult>, ItunesError> {
        let url = self.request_url(request)?;
        tracing::debug!(%url, "requesting search results");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ItunesError::Status(status.as_u16()));
        }

        // The endpoint answers with `text/javascript`, so decode the body ourselves.
        let body = response.text().await?;
        parse_results(&body)
    }
}

/// Maps a provider payload into result rows, skipping lookup wrapper records for the artist itself.
pub fn parse_results(body: &str) -> Result<Vec<SearchResult>, ItunesError> {
    let payload: SearchResponse =
        serde_json::from_str(body).map_err(|err| ItunesError::Parse(err.to_string()))?;

    payload
        .results
        .into_iter()
        .filter(|item| item.wrapper_type.as_deref() != Some("artist"))
        .map(SearchResult::try_from)
        .collect()
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<ResultItem>,
}

#[derive(Debug, Deserialize)]
struct ResultItem {
    #[serde(rename = "wrapperType", default)]
    wrapper_type: Option<String>,
    #[serde(rename = "trackName", default)]
    track_name: Option<String>,
    #[serde(rename = "collectionName", default)]
    collection_name: Option<String>,
    #[serde(rename = "artistName")]
    artist_name: String,
    #[serde(rename = "trackViewUrl", default)]
    track_view_url: Option<String>,
    #[serde(rename = "collectionViewUrl", default)]
    collection_view_url: Option<String>,
    #[serde(rename = "artworkUrl30", default)]
    artwork_url_30: Option<String>,
    #[serde(rename = "artistId")]
    artist_id: TextOrNumber,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(i64),
}

impl TextOrNumber {
    fn into_string(self) -> String {
        match self {
            TextOrNumber::Text(value) => value,
            TextOrNumber::Number(value) => value.to_string(),
        }
    }
}

impl TryFrom<ResultItem> for SearchResult {
    type Error = ItunesError;

    fn try_from(item: ResultItem) -> Result<Self, Self::Error> {
        let display_name = item
            .track_name
            .or(item.collection_name)
            .ok_or_else(|| {
                ItunesError::Parse(format!(
                    "result by '{}' has neither trackName nor collectionName",
                    item.artist_name
                ))
            })?;

        Ok(Self {
            display_name,
            artist_name: item.artist_name,
            external_link: item
                .track_view_url
                .or(item.collection_view_url)
                .unwrap_or_default(),
            thumbnail_url: item.artwork_url_30.unwrap_or_default(),
            artist_id: item.artist_id.into_string(),
        })
    }
}
