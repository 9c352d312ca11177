//! Tolerant HTML token trees.
//!
//! [`Tokenizer`] splits markup into primitive tokens, [`TreeBuilder`] turns
//! them into nested [`Node`]s while recovering from missing and misplaced
//! close tags, and [`render`] writes a tree back out as markup. Trees can also
//! be built by hand in shorthand form ([`tok`]) and normalized.
pub mod builder;
pub mod collect;
pub mod debug;
pub mod entities;
#[doc(hidden)]
pub mod perf_fixtures;
pub mod render;
pub mod tags;
pub mod tok;
pub mod tokenizer;
pub mod traverse;
mod types;

pub use crate::builder::{TreeBuilder, TreeBuilderConfig, parse};
pub use crate::collect::{escape_text, flatten_text};
pub use crate::debug::outline;
pub use crate::entities::decode_entities;
pub use crate::render::{
    FsOpener, IncludeError, NoIncludes, RenderConfig, ResourceOpener, render, render_to_string,
    render_toks, render_with,
};
pub use crate::tok::{Tok, make_token, normalize};
pub use crate::tokenizer::{
    RawText, TokenSource, TokenStream, Tokenizer, TokenizerConfig, tokenize, tokenize_with,
};
pub use crate::traverse::{find_all, find_tags, visit_all, visit_all_mut};
pub use crate::types::{Attributes, Element, Node, Token};
