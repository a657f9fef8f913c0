//! Tolerant HTML front end: tokenizer, entity decoding, and a tree builder
//! with implicit-tag recovery. Malformed markup never fails — it degrades.

pub mod head;

mod dom;
mod entities;
mod tokenizer;
mod tree_builder;

pub use dom::{is_head_tag, is_self_closing, Dom, Node, NodeId};
pub use tokenizer::{escape_source, tokenize, tokenize_with, Token, TokenizeOptions};
pub use tree_builder::{build_dom, parse, TreeBuilder};
