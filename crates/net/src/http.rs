//! Blocking HTTP/1.1 transport: one request per connection, `Connection: close`.
//!
//! Covers exactly what the renderer needs — status line + headers, chunked
//! transfer decoding, gzip content decoding, and charset-aware body decode.
//! No keep-alive, no pipelining, no retries: a failed connection fails the
//! whole load.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;

use flate2::read::GzDecoder;

use crate::url::Url;
use crate::LoadError;

pub const USER_AGENT: &str = "Skiff/0.1";

/// Statuses in this range carry a `Location` header we follow.
const REDIRECT_STATUSES: std::ops::RangeInclusive<u16> = 300..=398;

#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    /// Header names lower-cased; duplicate keys keep the last value.
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_redirect(&self) -> bool {
        REDIRECT_STATUSES.contains(&self.status)
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get("location").map(String::as_str)
    }
}

trait ReadWrite: Read + Write {}
impl<T: Read + Write> ReadWrite for T {}

/// Perform a single GET against `url`. Redirect responses are returned to the
/// caller with an empty body; the fetcher decides whether to follow them.
pub fn fetch(url: &Url, extra_headers: &[(String, String)]) -> Result<HttpResponse, LoadError> {
    let Url::Http {
        secure,
        host,
        port,
        path,
    } = url
    else {
        // The fetcher dispatches file/data before reaching the transport.
        return Err(LoadError::Protocol("transport called for non-http url".into()));
    };

    log::debug!("GET {host}:{port}{path} (tls: {secure})");

    let tcp = TcpStream::connect((host.as_str(), *port)).map_err(|source| {
        LoadError::Unavailable {
            url: format!("{host}:{port}"),
            source,
        }
    })?;

    let mut stream: Box<dyn ReadWrite> = if *secure {
        Box::new(tls_stream(host, tcp)?)
    } else {
        Box::new(tcp)
    };

    let mut request = format!(
        "GET {path} HTTP/1.1\r\n\
         Host: {host}\r\n\
         Connection: close\r\n\
         User-Agent: {USER_AGENT}\r\n\
         Accept-Encoding: gzip\r\n"
    );
    for (name, value) in extra_headers {
        request.push_str(name);
        request.push_str(": ");
        request.push_str(value);
        request.push_str("\r\n");
    }
    request.push_str("\r\n");

    let io_err = |source: std::io::Error| LoadError::Unavailable {
        url: format!("{host}:{port}"),
        source,
    };

    stream.write_all(request.as_bytes()).map_err(io_err)?;
    stream.flush().map_err(io_err)?;

    read_response(&mut BufReader::new(stream))
}

/// Parse a full HTTP response off `reader`. Separate from [`fetch`] so tests
/// can drive it with an in-memory reader.
pub(crate) fn read_response<R: BufRead>(reader: &mut R) -> Result<HttpResponse, LoadError> {
    let status_line = read_line(reader)?;
    // Split on the first two spaces only; the reason phrase may contain spaces.
    let mut fields = status_line.trim_end().splitn(3, ' ');
    let _version = fields
        .next()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| LoadError::Protocol(format!("bad status line {status_line:?}")))?;
    let status: u16 = fields
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| LoadError::Protocol(format!("bad status line {status_line:?}")))?;

    let mut headers = BTreeMap::new();
    loop {
        let line = read_line(reader)?;
        if line == "\r\n" || line == "\n" || line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            return Err(LoadError::Protocol(format!("malformed header line {line:?}")));
        };
        headers.insert(name.to_ascii_lowercase(), value.trim().to_string());
    }

    if REDIRECT_STATUSES.contains(&status) {
        // Don't bother draining the body of a redirect.
        return Ok(HttpResponse {
            status,
            headers,
            body: String::new(),
        });
    }

    let mut raw = if header_contains(&headers, "transfer-encoding", "chunked") {
        unchunk(reader)?
    } else {
        let mut raw = Vec::new();
        reader
            .read_to_end(&mut raw)
            .map_err(|e| LoadError::Protocol(format!("truncated body: {e}")))?;
        raw
    };

    if let Some(encoding) = headers.get("content-encoding") {
        if !encoding.contains("gzip") {
            return Err(LoadError::UnsupportedContentEncoding(encoding.clone()));
        }
        let mut decoded = Vec::new();
        GzDecoder::new(raw.as_slice())
            .read_to_end(&mut decoded)
            .map_err(|e| LoadError::Protocol(format!("bad gzip body: {e}")))?;
        raw = decoded;
    }

    let body = decode_text(&headers, &raw);
    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn read_line<R: BufRead>(reader: &mut R) -> Result<String, LoadError> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .map_err(|e| LoadError::Protocol(format!("connection dropped mid-response: {e}")))?;
    Ok(line)
}

fn header_contains(headers: &BTreeMap<String, String>, name: &str, needle: &str) -> bool {
    headers
        .get(name)
        .is_some_and(|value| value.to_ascii_lowercase().contains(needle))
}

/// Decode chunked transfer framing: hex length line, that many bytes, CRLF,
/// until a zero-length chunk.
pub(crate) fn unchunk<R: BufRead>(reader: &mut R) -> Result<Vec<u8>, LoadError> {
    let mut body = Vec::new();
    loop {
        let mut size_line = String::new();
        let read = reader
            .read_line(&mut size_line)
            .map_err(|e| LoadError::Protocol(format!("truncated chunk header: {e}")))?;
        if read == 0 {
            return Err(LoadError::Protocol("missing terminating chunk".into()));
        }
        // Chunk extensions after `;` are ignored.
        let size_field = size_line.trim_end();
        let size_field = size_field.split(';').next().unwrap_or(size_field).trim();
        let size = usize::from_str_radix(size_field, 16)
            .map_err(|_| LoadError::Protocol(format!("bad chunk size {size_field:?}")))?;
        if size == 0 {
            break;
        }
        // Read through `take` so a huge declared size never pre-allocates;
        // the buffer only grows as bytes actually arrive.
        let mut chunk = Vec::new();
        let got = reader
            .by_ref()
            .take(size as u64 + 2) // content + trailing CRLF
            .read_to_end(&mut chunk)
            .map_err(|e| LoadError::Protocol(format!("truncated chunk: {e}")))?;
        if got != size + 2 {
            return Err(LoadError::Protocol(format!(
                "truncated chunk: got {got} of {size} bytes"
            )));
        }
        chunk.truncate(size);
        body.append(&mut chunk);
    }
    Ok(body)
}

/// Decode bytes using the `charset` parameter of `content-type`, defaulting
/// to UTF-8 when absent or unrecognized.
fn decode_text(headers: &BTreeMap<String, String>, raw: &[u8]) -> String {
    let encoding = headers
        .get("content-type")
        .and_then(|ct| charset_param(ct))
        .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()))
        .unwrap_or(encoding_rs::UTF_8);
    let (text, _, _) = encoding.decode(raw);
    text.into_owned()
}

fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

fn tls_stream(
    host: &str,
    tcp: TcpStream,
) -> Result<rustls::StreamOwned<rustls::ClientConnection, TcpStream>, LoadError> {
    let mut roots = rustls::RootCertStore::empty();
    for cert in rustls_native_certs::load_native_certs().certs {
        // Unparsable platform certs are skipped, not fatal.
        let _ = roots.add(cert);
    }
    let config = rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    let server_name = rustls::pki_types::ServerName::try_from(host.to_string())
        .map_err(|_| LoadError::Protocol(format!("invalid tls server name {host:?}")))?;
    let connection =
        rustls::ClientConnection::new(Arc::new(config), server_name).map_err(LoadError::Tls)?;
    Ok(rustls::StreamOwned::new(connection, tcp))
}
