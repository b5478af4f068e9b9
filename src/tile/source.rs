//! Metadata and index document retrieval.

use std::sync::mpsc;

use rustc_hash::FxHashMap;

use super::TileId;
#[cfg(feature = "http")]
use crate::error::SplatMapError;

/// What a fetched document is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Metadata of a registered tile.
    Tile(TileId),
    /// A scene index listing tile metadata URLs.
    SceneIndex,
}

/// A fetched document. `body` is `None` when the fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    /// Purpose of the document.
    pub kind: DocumentKind,
    /// URL it was fetched from.
    pub url: String,
    /// Response body of a successful fetch.
    pub body: Option<String>,
}

/// One-shot handle for answering a fetch. `Send`, so sources may resolve it
/// from a worker thread.
#[derive(Debug)]
pub struct FetchCompletion {
    kind: DocumentKind,
    url: String,
    tx: mpsc::Sender<FetchedDocument>,
}

impl FetchCompletion {
    /// URL to fetch.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Deliver the response body, or `None` on any failure.
    pub fn resolve(self, body: Option<String>) {
        let doc = FetchedDocument {
            kind: self.kind,
            url: self.url,
            body,
        };
        if let Err(mpsc::SendError(doc)) = self.tx.send(doc) {
            log::debug!("{}: viewer closed before fetch finished", doc.url);
        }
    }
}

/// Queue of fetch completions, drained once per frame.
#[derive(Debug)]
pub struct FetchChannel {
    tx: mpsc::Sender<FetchedDocument>,
    rx: mpsc::Receiver<FetchedDocument>,
}

impl Default for FetchChannel {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl FetchChannel {
    /// New completion handle.
    #[must_use]
    pub fn completion(&self, kind: DocumentKind, url: &str) -> FetchCompletion {
        FetchCompletion {
            kind,
            url: url.to_owned(),
            tx: self.tx.clone(),
        }
    }

    /// Every document received so far.
    #[must_use]
    pub fn drain(&self) -> Vec<FetchedDocument> {
        self.rx.try_iter().collect()
    }
}

/// Retrieves JSON documents by URL.
pub trait MetadataSource {
    /// Fetch `completion.url()` and resolve the completion with the body,
    /// or with `None` on a non-success status or transport failure.
    fn fetch(&mut self, completion: FetchCompletion);
}

// ---------------------------------------------------------------------------
// StaticMetadataSource
// ---------------------------------------------------------------------------

/// In-memory documents keyed by URL; resolves synchronously.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataSource {
    documents: FxHashMap<String, String>,
}

impl StaticMetadataSource {
    /// Empty source; every fetch fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the document served at `url`.
    #[must_use]
    pub fn with(mut self, url: &str, body: &str) -> Self {
        self.insert(url, body);
        self
    }

    /// Add or replace the document served at `url`.
    pub fn insert(&mut self, url: &str, body: &str) {
        let _ = self.documents.insert(url.to_owned(), body.to_owned());
    }
}

impl MetadataSource for StaticMetadataSource {
    fn fetch(&mut self, completion: FetchCompletion) {
        let body = self.documents.get(completion.url()).cloned();
        if body.is_none() {
            log::error!("{}: no such document", completion.url());
        }
        completion.resolve(body);
    }
}

// ---------------------------------------------------------------------------
// HttpMetadataSource
// ---------------------------------------------------------------------------

/// Fetches documents over HTTP on short-lived worker threads.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpMetadataSource {
    agent: ureq::Agent,
}

#[cfg(feature = "http")]
impl Default for HttpMetadataSource {
    fn default() -> Self {
        Self::new(web_time::Duration::from_secs(30))
    }
}

#[cfg(feature = "http")]
impl HttpMetadataSource {
    /// Source whose requests give up after `timeout`.
    #[must_use]
    pub fn new(timeout: web_time::Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: config.into(),
        }
    }

    /// Blocking GET returning the body text.
    pub fn get(&self, url: &str) -> Result<String, SplatMapError> {
        let mut response = self.agent.get(url).call()?;
        Ok(response.body_mut().read_to_string()?)
    }
}

#[cfg(feature = "http")]
impl MetadataSource for HttpMetadataSource {
    fn fetch(&mut self, completion: FetchCompletion) {
        let source = self.clone();
        let spawned = std::thread::Builder::new()
            .name("splatmap-fetch".into())
            .spawn(move || {
                let body = match source.get(completion.url()) {
                    Ok(body) => Some(body),
                    Err(e) => {
                        log::error!("{}: {e}", completion.url());
                        None
                    }
                };
                completion.resolve(body);
            });
        if let Err(e) = spawned {
            log::error!("failed to spawn fetch thread: {e}");
        }
    }
}
