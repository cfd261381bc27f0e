//! Knowledge-base lookups for concept details (preferred term, definitions,
//! statements) keyed by Wikipedia page id, plus the page thumbnail from the
//! Wikipedia API.

use crate::error::KnowledgeBaseError;
use crate::form::service_url;
use crate::models::Concept;
use async_trait::async_trait;
use std::time::Duration;

pub const DEFAULT_LANG: &str = "en";
pub const THUMBNAIL_SIZE: u32 = 200;

/// `{lang}` is replaced by the concept language.
const WIKIPEDIA_API: &str = "https://{lang}.wikipedia.org/w/api.php";

#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Look up a concept. `Ok(None)` means the knowledge base has no entry.
    async fn concept(&self, wikipedia_id: u64, lang: &str)
        -> Result<Option<Concept>, KnowledgeBaseError>;

    /// URL of the Wikipedia page image, if the page has one.
    async fn thumbnail(
        &self,
        _wikipedia_id: u64,
        _lang: &str,
    ) -> Result<Option<String>, KnowledgeBaseError> {
        Ok(None)
    }
}

/// Client for an entity-fishing style `kb/concept/{id}` endpoint.
pub struct HttpKnowledgeBase {
    http: reqwest::Client,
    base_url: String,
    image_api: String,
}

impl HttpKnowledgeBase {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            image_api: WIKIPEDIA_API.to_string(),
        })
    }

    /// Point thumbnail lookups at another MediaWiki API endpoint.
    pub fn with_image_api(mut self, image_api: &str) -> Self {
        self.image_api = image_api.to_string();
        self
    }

    pub fn concept_url(&self, wikipedia_id: u64) -> String {
        let id = wikipedia_id.to_string();
        let path = format!("kb/concept/{}", urlencoding::encode(&id));
        service_url(&self.base_url, &path)
    }

    pub fn image_api_url(&self, lang: &str) -> String {
        let lang: String = lang.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '-').collect();
        let lang = if lang.is_empty() { DEFAULT_LANG } else { lang.as_str() };
        self.image_api.replace("{lang}", lang)
    }
}

/// Pull `query.pages.{id}.thumbnail.source` out of a `pageimages` answer.
pub fn thumbnail_source(answer: &serde_json::Value, wikipedia_id: u64) -> Option<String> {
    answer
        .pointer(&format!("/query/pages/{}/thumbnail/source", wikipedia_id))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl KnowledgeBase for HttpKnowledgeBase {
    async fn concept(
        &self,
        wikipedia_id: u64,
        lang: &str,
    ) -> Result<Option<Concept>, KnowledgeBaseError> {
        let response = self
            .http
            .get(self.concept_url(wikipedia_id))
            .query(&[("lang", lang)])
            .send()
            .await?;

        match response.status() {
            s if s == reqwest::StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Ok(Some(response.json::<Concept>().await?)),
            s => Err(KnowledgeBaseError::Status(s)),
        }
    }

    async fn thumbnail(
        &self,
        wikipedia_id: u64,
        lang: &str,
    ) -> Result<Option<String>, KnowledgeBaseError> {
        let size = THUMBNAIL_SIZE.to_string();
        let id = wikipedia_id.to_string();
        let response = self
            .http
            .get(self.image_api_url(lang))
            .query(&[
                ("action", "query"),
                ("prop", "pageimages"),
                ("format", "json"),
                ("pithumbsize", size.as_str()),
                ("pageids", id.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(KnowledgeBaseError::Status(response.status()));
        }
        let answer: serde_json::Value = response.json().await?;
        Ok(thumbnail_source(&answer, wikipedia_id))
    }
}

/// Used when no knowledge base is configured: every lookup comes back empty.
pub struct NoKnowledgeBase;

#[async_trait]
impl KnowledgeBase for NoKnowledgeBase {
    async fn concept(&self, _: u64, _: &str) -> Result<Option<Concept>, KnowledgeBaseError> {
        Ok(None)
    }
}
