//! Tree-building behavior on well-formed and malformed documents.

use html::{parse, Dom, NodeId};

/// Compact structural snapshot: `tag(child child ...)` or `"text"`.
fn snapshot(dom: &Dom, id: NodeId) -> String {
    match dom.tag(id) {
        Some(tag) => {
            let children = dom
                .children(id)
                .iter()
                .map(|&c| snapshot(dom, c))
                .collect::<Vec<_>>();
            if children.is_empty() {
                tag.to_string()
            } else {
                format!("{tag}({})", children.join(" "))
            }
        }
        None => format!("{:?}", dom.text(id).unwrap()),
    }
}

fn tree(input: &str) -> String {
    let dom = parse(input);
    snapshot(&dom, dom.root())
}

#[test]
fn well_formed_tag_lands_under_implicit_body() {
    assert_eq!(tree("<b>text</b>"), "html(body(b(\"text\")))");
}

#[test]
fn plain_text_gets_html_and_body_wrappers() {
    assert_eq!(tree("plain text"), "html(body(\"plain text\"))");
}

#[test]
fn head_tags_get_an_implicit_head() {
    assert_eq!(
        tree("<title>T</title>hello"),
        "html(head(title(\"T\")) body(\"hello\"))"
    );
}

#[test]
fn explicit_structure_is_preserved() {
    assert_eq!(
        tree("<html><head><meta charset=utf-8></head><body>x</body></html>"),
        "html(head(meta) body(\"x\"))"
    );
}

#[test]
fn nested_paragraph_auto_closes() {
    assert_eq!(tree("<p>A<p>B"), "html(body(p(\"A\") p(\"B\")))");
}

#[test]
fn mismatched_close_tags_pop_the_innermost_element() {
    // </i> closes <b>: the close tag pops whatever is innermost.
    assert_eq!(tree("<b>bold</i>after"), "html(body(b(\"bold\") \"after\"))");
}

#[test]
fn stray_close_tag_is_ignored() {
    assert_eq!(tree("</div>text"), "html(body(\"text\"))");
}

#[test]
fn leading_close_tags_synthesize_no_wrappers() {
    // A run of stray closes must not open (and then pop) a body, which
    // would split the document across sibling bodies.
    assert_eq!(tree("</p></div><p>text</p>"), "html(body(p(\"text\")))");
}

#[test]
fn document_of_only_close_tags_is_a_bare_root() {
    assert_eq!(tree("</div></span>"), "html");
}

#[test]
fn doctype_produces_no_node() {
    assert_eq!(tree("<!DOCTYPE html><p>x</p>"), "html(body(p(\"x\")))");
}

#[test]
fn void_elements_stay_childless() {
    assert_eq!(
        tree("a<br>b<img src=x>c"),
        "html(body(\"a\" br \"b\" img \"c\"))"
    );
}

#[test]
fn empty_input_yields_a_bare_root() {
    assert_eq!(tree(""), "html");
    assert_eq!(tree("   \n  "), "html");
}

#[test]
fn unclosed_elements_are_attached_at_finish() {
    assert_eq!(
        tree("<div><ul><li>one"),
        "html(body(div(ul(li(\"one\")))))"
    );
}

#[test]
fn text_decodes_entities() {
    assert_eq!(tree("a &amp; b"), "html(body(\"a & b\"))");
    assert_eq!(tree("a &zzz; b"), "html(body(\"a &zzz; b\"))");
}

#[test]
fn parent_links_point_back_up() {
    let dom = parse("<p>A</p>");
    let body = dom.children(dom.root())[0];
    let p = dom.children(body)[0];
    let text = dom.children(p)[0];
    assert_eq!(dom.parent(text), Some(p));
    assert_eq!(dom.parent(p), Some(body));
    assert_eq!(dom.parent(body), Some(dom.root()));
    assert_eq!(dom.parent(dom.root()), None);
}

#[test]
fn attributes_reach_the_dom() {
    let dom = parse("<a href=/target id=link1>go</a>");
    let body = dom.children(dom.root())[0];
    let a = dom.children(body)[0];
    assert_eq!(dom.attr(a, "href"), Some("/target"));
    assert_eq!(dom.attr(a, "id"), Some("link1"));
    assert_eq!(dom.attr(a, "missing"), None);
}
