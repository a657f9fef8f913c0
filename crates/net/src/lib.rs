//! Resource loading for the renderer: scheme dispatch, redirect following,
//! and the conditional-request disk cache.
//!
//! Everything is synchronous and blocking. One [`Fetcher::load`] call maps to
//! at most `MAX_REDIRECTS + 1` socket round trips (http/https) or a single
//! file read / data-URL decode.

mod cache;
mod clock;
mod http;
mod url;

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

pub use cache::Cache;
pub use http::{HttpResponse, USER_AGENT};
pub use url::Url;

/// Redirect hop bound; exceeding it fails the whole load.
pub const MAX_REDIRECTS: usize = 5;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported scheme in {0:?}")]
    UnsupportedScheme(String),
    #[error("too many redirects while loading {0}")]
    TooManyRedirects(String),
    #[error("unsupported content encoding {0:?}")]
    UnsupportedContentEncoding(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("resource unavailable: {url}")]
    Unavailable {
        url: String,
        #[source]
        source: std::io::Error,
    },
    #[error("tls failure")]
    Tls(#[source] rustls::Error),
}

/// How `data:` payloads are presented to the parser. Earlier iterations of
/// the engine returned the payload raw; later ones wrapped it in a synthetic
/// `<body>` so the body-only token filter keeps it. Both behaviors are kept
/// selectable; `Wrapped` is the default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DataBodyWrap {
    #[default]
    Wrapped,
    Raw,
}

/// A loaded resource, ready for tokenizing.
#[derive(Debug)]
pub struct Fetched {
    pub headers: BTreeMap<String, String>,
    pub body: String,
    /// Set when the URL carried a `view-source:` prefix; the caller must
    /// escape `<`/`>` before tokenizing so the markup renders as text.
    pub view_source: bool,
}

pub struct Fetcher {
    cache: Option<Cache>,
    data_body_wrap: DataBodyWrap,
    extra_headers: Vec<(String, String)>,
}

impl Default for Fetcher {
    fn default() -> Self {
        Fetcher::new()
    }
}

impl Fetcher {
    pub fn new() -> Fetcher {
        Fetcher {
            cache: None,
            data_body_wrap: DataBodyWrap::default(),
            extra_headers: Vec::new(),
        }
    }

    pub fn with_cache(mut self, dir: impl Into<PathBuf>) -> Fetcher {
        self.cache = Some(Cache::new(dir));
        self
    }

    pub fn data_body_wrap(mut self, wrap: DataBodyWrap) -> Fetcher {
        self.data_body_wrap = wrap;
        self
    }

    /// Headers appended to every outgoing request, after the fixed set.
    pub fn extra_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Fetcher {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    /// Load `url`, following redirects and consulting the cache for
    /// http/https. file/data bypass the cache entirely.
    pub fn load(&self, url: &str) -> Result<Fetched, LoadError> {
        let (view_source, url) = match url.strip_prefix("view-source:") {
            Some(inner) => (true, inner),
            None => (false, url),
        };

        let mut current = url.to_string();
        let mut hops = 0usize;
        loop {
            let parsed = Url::parse(&current)?;
            match parsed {
                Url::Http { .. } => {
                    if let Some(cache) = &self.cache {
                        if let Some((headers, body)) = cache.lookup(&current) {
                            return Ok(Fetched {
                                headers,
                                body,
                                view_source,
                            });
                        }
                    }

                    let response = http::fetch(&parsed, &self.extra_headers)?;
                    if response.is_redirect() {
                        hops += 1;
                        if hops > MAX_REDIRECTS {
                            return Err(LoadError::TooManyRedirects(url.to_string()));
                        }
                        let Some(location) = response.location() else {
                            return Err(LoadError::Protocol(format!(
                                "{} redirect without location from {current}",
                                response.status
                            )));
                        };
                        let next = parsed.resolve_redirect(location);
                        log::debug!("redirect {hops}/{MAX_REDIRECTS}: {current} -> {next}");
                        current = next;
                        continue;
                    }

                    if let Some(cache) = &self.cache {
                        cache.store(&current, &response.headers, &response.body);
                    }
                    return Ok(Fetched {
                        headers: response.headers,
                        body: response.body,
                        view_source,
                    });
                }
                Url::File { path } => {
                    let body = fs::read_to_string(&path).map_err(|source| {
                        LoadError::Unavailable {
                            url: current.clone(),
                            source,
                        }
                    })?;
                    return Ok(Fetched {
                        headers: BTreeMap::new(),
                        body,
                        view_source,
                    });
                }
                Url::Data { payload } => {
                    let body = match self.data_body_wrap {
                        DataBodyWrap::Wrapped => format!("<body>{payload}</body>"),
                        DataBodyWrap::Raw => payload,
                    };
                    return Ok(Fetched {
                        headers: BTreeMap::new(),
                        body,
                        view_source,
                    });
                }
            }
        }
    }
}
