//! Flat HTML tokenizer: a single left-to-right scan into Text/Tag tokens.
//!
//! The tokenizer is tolerant by construction. It never fails; malformed
//! markup degrades into text or gets dropped:
//! - `<!--...-->` comments are discarded entirely, tag and contents.
//! - `<script>` bodies are suppressed until the matching `</script>` —
//!   best-effort rawtext handling, not true CDATA.
//! - An unterminated tag at end of input is dropped.
//!
//! Entity decoding runs on text content only, never on tag interiors; see
//! [`crate::entities`] for the exact table and lookback rules.

use memchr::memchr;

use crate::entities::decode_entities;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";
const SCRIPT_CLOSE_TAG: &[u8] = b"</script";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// Character data with entities decoded.
    Text(String),
    /// A start, end (leading `/` kept in `name`), or declaration tag.
    /// `raw_attrs` is the unparsed attribute text; the tree builder parses
    /// it on demand.
    Tag { name: String, raw_attrs: String },
}

impl Token {
    pub fn tag(name: &str) -> Token {
        Token::Tag {
            name: name.to_string(),
            raw_attrs: String::new(),
        }
    }

    pub fn is_tag_named(&self, target: &str) -> bool {
        matches!(self, Token::Tag { name, .. } if name == target)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TokenizeOptions {
    /// Keep only the tokens strictly between the first `<body...>` tag and
    /// its `</body>`, discarding head metadata and the wrapper tags
    /// themselves.
    pub body_only: bool,
}

pub fn tokenize(input: &str) -> Vec<Token> {
    tokenize_with(input, TokenizeOptions::default())
}

pub fn tokenize_with(input: &str, options: TokenizeOptions) -> Vec<Token> {
    let mut out = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            // Text run up to the next tag open.
            let end = memchr(b'<', &bytes[i..]).map_or(bytes.len(), |rel| i + rel);
            let decoded = decode_entities(&input[i..end]);
            if !decoded.is_empty() {
                out.push(Token::Text(decoded));
            }
            i = end;
            continue;
        }

        if input[i..].starts_with(COMMENT_START) {
            let content_start = i + COMMENT_START.len();
            match input[content_start..].find(COMMENT_END) {
                Some(rel) => i = content_start + rel + COMMENT_END.len(),
                // Unterminated comment swallows the rest of the input.
                None => i = bytes.len(),
            }
            continue;
        }

        // Tag context: everything up to the closing '>'.
        let Some(rel) = memchr(b'>', &bytes[i + 1..]) else {
            log::debug!("dropping unterminated tag at byte {i}");
            break;
        };
        let interior = &input[i + 1..i + 1 + rel];
        i += 1 + rel + 1;

        let (name, raw_attrs) = split_tag_interior(interior);
        let name = name.to_ascii_lowercase();
        if name.is_empty() {
            // A bare `<>` (or `< attr>`) names nothing; drop it.
            continue;
        }

        if name == "script" {
            out.push(Token::Tag {
                name,
                raw_attrs: raw_attrs.to_string(),
            });
            // Suppress the script body; scan straight for the close tag.
            match find_script_close(input, i) {
                Some((_, close_end)) => {
                    out.push(Token::tag("/script"));
                    i = close_end;
                }
                None => i = bytes.len(),
            }
            continue;
        }

        out.push(Token::Tag {
            name,
            raw_attrs: raw_attrs.to_string(),
        });
    }

    log::trace!("tokenized {} bytes into {} tokens", input.len(), out.len());
    if options.body_only {
        restrict_to_body(out)
    } else {
        out
    }
}

/// Escape raw markup so it renders as visible text, wrapped in a synthetic
/// body so the body-only filter keeps it. Used for `view-source:` loads.
pub fn escape_source(body: &str) -> String {
    let escaped = body.replace('<', "&lt;").replace('>', "&gt;");
    format!("<body>{escaped}</body>")
}

/// Split a tag interior into (name, raw attribute text) at the first
/// whitespace run.
fn split_tag_interior(interior: &str) -> (&str, &str) {
    match interior.find(|c: char| c.is_ascii_whitespace()) {
        Some(pos) => (&interior[..pos], interior[pos..].trim_start()),
        None => (interior, ""),
    }
}

/// Find `</script` followed by optional whitespace and `>`, starting the
/// search at byte `from`. Returns (tag start, end past the `>`).
fn find_script_close(input: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = input.as_bytes();
    let n = SCRIPT_CLOSE_TAG.len();
    let mut i = from;
    while i + n <= bytes.len() {
        let rel = memchr(b'<', &bytes[i..])?;
        i += rel;
        if i + n > bytes.len() {
            return None;
        }
        if bytes[i..i + n].eq_ignore_ascii_case(SCRIPT_CLOSE_TAG) {
            let mut k = i + n;
            while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < bytes.len() && bytes[k] == b'>' {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

/// Keep only tokens between the first `<body...>` and its `</body>`.
/// Inputs without a body tag yield nothing at all.
fn restrict_to_body(tokens: Vec<Token>) -> Vec<Token> {
    let Some(open) = tokens.iter().position(|t| t.is_tag_named("body")) else {
        return Vec::new();
    };
    let rest = &tokens[open + 1..];
    let close = rest
        .iter()
        .position(|t| t.is_tag_named("/body"))
        .unwrap_or(rest.len());
    rest[..close].to_vec()
}
