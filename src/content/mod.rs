//! Content module - the build-time content store
//!
//! Markdown documents with front-matter are parsed once into immutable
//! [`ContentNode`]s and kept in source order. Pages query the store by
//! listing every node or by exact match on the front-matter `path`.

mod frontmatter;
mod markdown;
mod node;
mod store;

pub use frontmatter::FrontMatter;
pub use markdown::MarkdownRenderer;
pub use node::{ContentNode, NodeFrontmatter};
pub use store::{ContentLoader, ContentStore, StoreError};
