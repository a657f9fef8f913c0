//! Head metadata extraction: title, meta tags, links, base href.

use crate::dom::{Dom, NodeId};

#[derive(Debug, Clone, Default)]
pub struct HeadMetadata {
    pub title: Option<String>,
    pub meta: Vec<MetaTag>,
    pub links: Vec<LinkTag>,
    pub base_href: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MetaTag {
    pub name: Option<String>,     // e.g. name="description"
    pub property: Option<String>, // e.g. property="og:title"
    pub content: Option<String>,  // e.g. content="Some text"
}

#[derive(Debug, Clone)]
pub struct LinkTag {
    pub rel: Vec<String>, // e.g. ["icon"], ["stylesheet"]
    pub href: Option<String>,
}

pub fn extract_head_metadata(dom: &Dom) -> HeadMetadata {
    let mut out = HeadMetadata::default();
    if let Some(head) = find_head(dom) {
        fill_from_head(dom, head, &mut out);
    }
    out
}

fn find_head(dom: &Dom) -> Option<NodeId> {
    // The root is always <html>; <head>, when present, is a direct child.
    dom.children(dom.root())
        .iter()
        .copied()
        .find(|&child| dom.tag(child) == Some("head"))
}

fn fill_from_head(dom: &Dom, head: NodeId, out: &mut HeadMetadata) {
    for &child in dom.children(head) {
        match dom.tag(child) {
            Some("title") => {
                if out.title.is_none() {
                    out.title = first_text_child(dom, child);
                }
            }
            Some("meta") => {
                let tag = MetaTag {
                    name: dom.attr(child, "name").map(str::to_string),
                    property: dom.attr(child, "property").map(str::to_string),
                    content: dom.attr(child, "content").map(str::to_string),
                };
                if tag.name.is_some() || tag.property.is_some() || tag.content.is_some() {
                    out.meta.push(tag);
                }
            }
            Some("link") => {
                let rel = dom
                    .attr(child, "rel")
                    .unwrap_or("")
                    .split_whitespace()
                    .map(|s| s.to_ascii_lowercase())
                    .collect::<Vec<_>>();
                let href = dom.attr(child, "href").map(str::to_string);
                if !rel.is_empty() || href.is_some() {
                    out.links.push(LinkTag { rel, href });
                }
            }
            Some("base") => {
                if out.base_href.is_none() {
                    out.base_href = dom.attr(child, "href").map(str::to_string);
                }
            }
            _ => {}
        }
    }
}

fn first_text_child(dom: &Dom, id: NodeId) -> Option<String> {
    dom.children(id).iter().find_map(|&child| {
        let text = dom.text(child)?.trim();
        (!text.is_empty()).then(|| text.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree_builder::parse;

    #[test]
    fn extracts_title_meta_link_and_base() {
        let dom = parse(
            "<title>My Page</title>\
             <meta name=description content=words>\
             <link rel=stylesheet href=site.css>\
             <base href=https://example.com/>\
             <body>text</body>",
        );
        let head = extract_head_metadata(&dom);
        assert_eq!(head.title.as_deref(), Some("My Page"));
        assert_eq!(head.meta.len(), 1);
        assert_eq!(head.meta[0].name.as_deref(), Some("description"));
        assert_eq!(head.links.len(), 1);
        assert_eq!(head.links[0].rel, vec!["stylesheet"]);
        assert_eq!(head.base_href.as_deref(), Some("https://example.com/"));
    }

    #[test]
    fn document_without_head_yields_defaults() {
        let head = extract_head_metadata(&parse("plain text"));
        assert!(head.title.is_none());
        assert!(head.meta.is_empty());
        assert!(head.links.is_empty());
    }
}
