//! Decode a minimal, explicitly limited table of HTML character references.
//!
//! Contract:
//! - Named entities decoded: `&quot;`, `&amp;`, `&lt;`, `&gt;`, `&nbsp;`,
//!   `&ndash;`, `&copy;`, plus the numeric apostrophe `&#39;`.
//! - Resolution is lookback-driven: a `;` closes the span opened by the most
//!   recent `&`; if the span names a known entity the whole `&name;` run is
//!   replaced in place, otherwise the text is left untouched. Nested or
//!   earlier ampersands are never reconsidered.
//! - Unknown names and stray `&`/`;` pass through literally.
//!
//! This is intentionally not HTML5-spec-complete. Keep the table narrow and
//! the behavior stable; extend by adding rows to [`entity`].

/// Resolve one entity name (the text between `&` and `;`).
fn entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "quot" => "\"",
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "nbsp" => " ",
        "ndash" => "-",
        "copy" => "\u{00A9}",
        "#39" => "'",
        _ => return None,
    })
}

/// Decode entities in a text run. Tag interiors must not be passed here;
/// entity decoding applies to character data only.
pub(crate) fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Byte offset in `out` of the most recent unresolved '&'.
    let mut last_amp: Option<usize> = None;

    for ch in text.chars() {
        match ch {
            '&' => {
                last_amp = Some(out.len());
                out.push('&');
            }
            ';' => {
                if let Some(start) = last_amp {
                    if let Some(replacement) = entity(&out[start + 1..]) {
                        out.truncate(start);
                        out.push_str(replacement);
                        last_amp = None;
                        continue;
                    }
                }
                // Not a known entity; keep the literal ';' and leave the
                // '&' marker in place so `&amp;;` style runs stay literal.
                out.push(';');
            }
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_entities_decode() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&lt;p&gt;"), "<p>");
        assert_eq!(decode_entities("&quot;hi&quot;"), "\"hi\"");
        assert_eq!(decode_entities("1&nbsp;&ndash;&nbsp;2"), "1 - 2");
        assert_eq!(decode_entities("&copy; 2024"), "\u{00A9} 2024");
    }

    #[test]
    fn numeric_apostrophe_decodes() {
        assert_eq!(decode_entities("it&#39;s"), "it's");
    }

    #[test]
    fn unknown_entities_stay_literal() {
        assert_eq!(decode_entities("a &zzz; b"), "a &zzz; b");
        assert_eq!(decode_entities("&#40;"), "&#40;");
    }

    #[test]
    fn stray_punctuation_passes_through() {
        assert_eq!(decode_entities("fish & chips; please"), "fish & chips; please");
        assert_eq!(decode_entities(";;;"), ";;;");
        assert_eq!(decode_entities("&"), "&");
    }

    #[test]
    fn only_the_most_recent_ampersand_is_considered() {
        // The second '&' shadows the first; "amp& gt" is not a name.
        assert_eq!(decode_entities("&am&gt;"), "&am>");
    }

    #[test]
    fn consecutive_entities_decode_independently() {
        assert_eq!(decode_entities("&lt;&gt;&lt;"), "<><");
    }
}
