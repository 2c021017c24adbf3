//! Content node model

use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::PathBuf;

/// One parsed markdown document
#[derive(Debug, Clone, Serialize)]
pub struct ContentNode {
    /// Stable identifier derived from the relative source path
    pub id: String,

    /// Source file path relative to the source dir
    pub source: String,

    /// Rendered HTML body
    pub html: String,

    /// Plain-text summary
    pub excerpt: String,

    pub frontmatter: NodeFrontmatter,
}

/// Front-matter after validation and resolution
#[derive(Debug, Clone, Default, Serialize)]
pub struct NodeFrontmatter {
    pub title: String,
    pub author: String,
    /// Routing key, unique across the store
    pub path: String,
    pub date: Option<NaiveDateTime>,
    /// Avatar image file, resolved against the document's directory
    pub avatar: Option<PathBuf>,
}

impl ContentNode {
    /// Output location of this node's page, relative to the public dir
    pub fn output_path(&self) -> PathBuf {
        let clean = self.frontmatter.path.trim_matches('/');
        if clean.is_empty() {
            PathBuf::from("index.html")
        } else {
            PathBuf::from(clean).join("index.html")
        }
    }
}
