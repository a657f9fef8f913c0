//! Token stream to tree, with malformed-markup recovery.
//!
//! The builder keeps a stack of currently open elements. Recovery rules, in
//! the order they apply to each incoming token:
//! - a close tag pops the innermost open element whatever its name; a stray
//!   close with only the root (or nothing) open is ignored and synthesizes
//!   no wrappers;
//! - implicit wrappers: a missing `html`/`head`/`body` ancestor is
//!   synthesized based on what the incoming open tag or text needs, and an
//!   open `head` auto-closes when body content arrives;
//! - `<p>` inside an open `<p>` closes the outer one first (sibling, not
//!   nested);
//! - `!`-declarations produce no node, void elements never get pushed.
//!
//! Parsing never fails: every input produces a tree rooted at `html`.

use crate::dom::{is_head_tag, is_self_closing, Dom, NodeId};
use crate::tokenizer::{tokenize, Token};

/// Tokenize and build in one step.
pub fn parse(input: &str) -> Dom {
    build_dom(&tokenize(input))
}

/// Build a tree from an existing token stream.
pub fn build_dom(tokens: &[Token]) -> Dom {
    let mut builder = TreeBuilder::new();
    for token in tokens {
        match token {
            Token::Text(text) => builder.add_text(text),
            Token::Tag { name, raw_attrs } => builder.add_tag(name, raw_attrs),
        }
    }
    builder.finish()
}

pub struct TreeBuilder {
    dom: Dom,
    open: Vec<NodeId>,
}

impl TreeBuilder {
    pub fn new() -> TreeBuilder {
        TreeBuilder {
            dom: Dom::new(),
            open: Vec::new(),
        }
    }

    pub fn add_text(&mut self, text: &str) {
        if text.chars().all(char::is_whitespace) {
            return;
        }
        self.insert_implicit_tags(None);
        let parent = *self.open.last().expect("implicit tags opened a parent");
        self.dom.push_text(text.to_string(), parent);
    }

    pub fn add_tag(&mut self, name: &str, raw_attrs: &str) {
        if name.starts_with('!') {
            return;
        }
        if let Some(close_name) = name.strip_prefix('/') {
            // Close tags never synthesize ancestors; the innermost element
            // closes regardless of its name, and a stray close with nothing
            // but the root open is dropped outright.
            if self.open.len() > 1 {
                self.open.pop();
            } else {
                log::debug!("ignoring stray close tag </{close_name}>");
            }
            return;
        }
        self.insert_implicit_tags(Some(name));

        // Common malformed-HTML recovery: a new <p> closes an open <p>.
        if name == "p" && self.innermost_tag() == Some("p") {
            self.open.pop();
        }

        let attributes = parse_attributes(raw_attrs);
        let parent = self.open.last().copied();
        let id = self.dom.push_element(name.to_string(), attributes, parent);
        if !is_self_closing(name) {
            self.open.push(id);
        }
    }

    /// Close out the document. Anything still open is already attached to
    /// its parent, so this only drains the stack; an empty document gets a
    /// bare `html` root.
    pub fn finish(mut self) -> Dom {
        if self.dom.is_empty() {
            self.dom.push_element("html".to_string(), Vec::new(), None);
        }
        self.open.clear();
        self.dom
    }

    fn innermost_tag(&self) -> Option<&str> {
        self.open.last().and_then(|&id| self.dom.tag(id))
    }

    /// Synthesize the structural ancestors the incoming token requires.
    /// `incoming` is `None` for text; close tags never reach here.
    fn insert_implicit_tags(&mut self, incoming: Option<&str>) {
        loop {
            let open_tags: Vec<&str> =
                self.open.iter().filter_map(|&id| self.dom.tag(id)).collect();

            if open_tags.is_empty() {
                if incoming == Some("html") {
                    return;
                }
                self.open_element("html");
                continue;
            }

            if open_tags == ["html"] {
                match incoming {
                    Some("head") | Some("body") => return,
                    Some(tag) if is_head_tag(tag) => {
                        self.open_element("head");
                        continue;
                    }
                    _ => {
                        self.open_element("body");
                        continue;
                    }
                }
            }

            if open_tags == ["html", "head"] {
                // Body content while <head> is open closes it implicitly.
                let belongs_in_head = match incoming {
                    Some(tag) => is_head_tag(tag),
                    None => false,
                };
                if !belongs_in_head {
                    self.open.pop();
                    continue;
                }
            }

            return;
        }
    }

    fn open_element(&mut self, tag: &str) {
        let parent = self.open.last().copied();
        let id = self.dom.push_element(tag.to_string(), Vec::new(), parent);
        self.open.push(id);
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        TreeBuilder::new()
    }
}

/// Parse raw attribute text: whitespace-separated pairs split on `=`,
/// surrounding quotes stripped from values longer than two characters,
/// boolean attributes mapped to an empty value. Names fold to lower case.
/// Known limitation: quoted values containing whitespace split apart, the
/// same way the naive whitespace split always has here.
fn parse_attributes(raw_attrs: &str) -> Vec<(String, String)> {
    let mut attributes = Vec::new();
    for pair in raw_attrs.split_ascii_whitespace() {
        if pair == "/" {
            // Trailing slash of a self-closing tag, not an attribute.
            continue;
        }
        match pair.split_once('=') {
            Some((name, value)) => {
                let value = if value.len() > 2
                    && (value.starts_with('\'') || value.starts_with('"'))
                {
                    &value[1..value.len() - 1]
                } else {
                    value
                };
                attributes.push((name.to_ascii_lowercase(), value.to_string()));
            }
            None => attributes.push((pair.to_ascii_lowercase(), String::new())),
        }
    }
    attributes
}
