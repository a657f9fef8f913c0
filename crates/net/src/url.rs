//! URL splitting for the small set of schemes the fetcher understands.
//!
//! This is deliberately not a general URL parser: no userinfo, no query/fragment
//! handling, no percent decoding. The fetcher only needs scheme dispatch plus
//! host/port/path for the socket schemes, so that is all we model.

use crate::LoadError;

pub const HTTP_PORT: u16 = 80;
pub const HTTPS_PORT: u16 = 443;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Url {
    Http {
        secure: bool,
        host: String,
        port: u16,
        path: String,
    },
    File {
        path: String,
    },
    Data {
        payload: String,
    },
}

impl Url {
    /// Split `scheme:rest` at the first colon and dispatch on the scheme.
    ///
    /// Unknown schemes are a hard error; `view-source:` is handled one level
    /// up (see [`crate::Fetcher::load`]) because it wraps a full URL.
    pub fn parse(url: &str) -> Result<Url, LoadError> {
        let Some((scheme, rest)) = url.split_once(':') else {
            return Err(LoadError::UnsupportedScheme(url.to_string()));
        };

        match scheme {
            "http" => parse_authority(rest, false),
            "https" => parse_authority(rest, true),
            "file" => {
                let path = rest.strip_prefix("//").unwrap_or(rest);
                if path.is_empty() {
                    return Err(LoadError::Protocol(format!("empty file url {url:?}")));
                }
                Ok(Url::File {
                    path: path.to_string(),
                })
            }
            "data" => {
                // `data:[mediatype][;options],payload` — the type info is only
                // checked for presence, the payload is taken verbatim.
                let Some((_typeinfo, payload)) = rest.split_once(',') else {
                    return Err(LoadError::Protocol(format!("data url without comma: {url:?}")));
                };
                Ok(Url::Data {
                    payload: payload.to_string(),
                })
            }
            _ => Err(LoadError::UnsupportedScheme(scheme.to_string())),
        }
    }

    /// Resolve a `Location` header against this URL: a leading `/` keeps the
    /// current scheme/host/port, anything else is taken as a full URL.
    pub fn resolve_redirect(&self, location: &str) -> String {
        if !location.starts_with('/') {
            return location.to_string();
        }
        match self {
            Url::Http {
                secure,
                host,
                port,
                ..
            } => {
                let scheme = if *secure { "https" } else { "http" };
                format!("{scheme}://{host}:{port}{location}")
            }
            // file/data fetches never produce redirects.
            Url::File { .. } | Url::Data { .. } => location.to_string(),
        }
    }
}

fn parse_authority(rest: &str, secure: bool) -> Result<Url, LoadError> {
    let Some(rest) = rest.strip_prefix("//") else {
        return Err(LoadError::Protocol(format!("missing // after scheme in {rest:?}")));
    };

    let (host_part, path) = match rest.split_once('/') {
        Some((host, tail)) => (host, format!("/{tail}")),
        None => (rest, "/index.html".to_string()),
    };

    let (host, port) = match host_part.rsplit_once(':') {
        Some((host, port)) => {
            let port: u16 = port
                .parse()
                .map_err(|_| LoadError::Protocol(format!("bad port in {host_part:?}")))?;
            (host, port)
        }
        None => (
            host_part,
            if secure { HTTPS_PORT } else { HTTP_PORT },
        ),
    };

    if host.is_empty() {
        return Err(LoadError::Protocol(format!("empty host in {rest:?}")));
    }

    Ok(Url::Http {
        secure,
        host: host.to_string(),
        port,
        path,
    })
}
