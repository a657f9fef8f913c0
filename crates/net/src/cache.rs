//! Disk cache for successful http/https responses, one file per URL.
//!
//! File layout (all text):
//!   line 1: ISO-8601 UTC expiry
//!   line 2: JSON-encoded header map
//!   rest:   response body
//!
//! Keys are the SHA-256 of the exact URL string, so the cache is content
//! addressed but not adversary-proof — a collision just serves the wrong
//! page, which is acceptable at this scope. The cache never revalidates
//! against the origin: entries are served verbatim until their expiry,
//! then deleted on the next lookup.
//!
//! No file locking. Concurrent processes sharing one cache directory can
//! race on the delete of an expired entry; single-process use is assumed.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::clock::{self, NowFn};

pub struct Cache {
    dir: PathBuf,
    now: NowFn,
}

impl Cache {
    pub fn new(dir: impl Into<PathBuf>) -> Cache {
        Cache {
            dir: dir.into(),
            now: clock::now_unix,
        }
    }

    /// Same cache but reading the given clock. Test seam.
    #[cfg(test)]
    pub(crate) fn with_clock(dir: impl Into<PathBuf>, now: NowFn) -> Cache {
        Cache {
            dir: dir.into(),
            now,
        }
    }

    fn entry_path(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        let mut name = String::with_capacity(digest.len() * 2);
        for byte in digest {
            let _ = write!(name, "{byte:02x}");
        }
        self.dir.join(name)
    }

    /// Store `headers`/`body` for `url` if the response is cacheable, i.e.
    /// `cache-control` carries a `max-age`. Effective TTL is `max-age - age`.
    /// Write failures are logged and swallowed; caching is best effort.
    pub fn store(&self, url: &str, headers: &BTreeMap<String, String>, body: &str) {
        let Some(max_age) = max_age_directive(headers) else {
            return;
        };
        let age: i64 = headers
            .get("age")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0);
        let ttl = max_age - age;
        if ttl <= 0 {
            return;
        }

        let expiry = clock::format_iso8601((self.now)() + ttl);
        let encoded_headers = match serde_json::to_string(headers) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("cache store skipped for {url}: {e}");
                return;
            }
        };

        if let Err(e) = fs::create_dir_all(&self.dir) {
            log::warn!("cache dir {:?} unavailable: {e}", self.dir);
            return;
        }
        let content = format!("{expiry}\n{encoded_headers}\n{body}\n");
        if let Err(e) = fs::write(self.entry_path(url), content) {
            log::warn!("cache store failed for {url}: {e}");
        } else {
            log::debug!("cached {url} until {expiry}");
        }
    }

    /// Return the stored headers/body for `url`, or `None` on a miss.
    /// Expired and corrupt entries are deleted and reported as misses.
    pub fn lookup(&self, url: &str) -> Option<(BTreeMap<String, String>, String)> {
        let path = self.entry_path(url);
        let content = fs::read_to_string(&path).ok()?;

        let parsed = parse_entry(&content, (self.now)());
        if parsed.is_none() {
            // Expired or corrupt either way; drop the file.
            if let Err(e) = fs::remove_file(&path) {
                log::warn!("failed to evict cache entry for {url}: {e}");
            }
            log::debug!("cache miss for {url}");
        } else {
            log::debug!("cache hit for {url}");
        }
        parsed
    }
}

fn parse_entry(content: &str, now: i64) -> Option<(BTreeMap<String, String>, String)> {
    let (expiry_line, rest) = content.split_once('\n')?;
    let expiry = clock::parse_iso8601(expiry_line)?;
    if now >= expiry {
        return None;
    }
    let (header_line, body) = rest.split_once('\n')?;
    let headers: BTreeMap<String, String> = serde_json::from_str(header_line).ok()?;
    // store() appends one trailing newline to the body section.
    let body = body.strip_suffix('\n').unwrap_or(body);
    Some((headers, body.to_string()))
}

/// Extract the `max-age` value from a `cache-control` header, if any.
fn max_age_directive(headers: &BTreeMap<String, String>) -> Option<i64> {
    let cache_control = headers.get("cache-control")?;
    cache_control.split(',').find_map(|directive| {
        let (name, value) = directive.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("max-age") {
            return None;
        }
        value.trim().parse().ok()
    })
}
