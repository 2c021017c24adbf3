//! Content store - loads markdown documents and answers page queries

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use super::{ContentNode, FrontMatter, MarkdownRenderer, NodeFrontmatter};
use crate::helpers::hash_content;
use crate::Gazette;

/// Content store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read {file:?}: {source}")]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid front-matter in {file}: {message}")]
    FrontMatter { file: String, message: String },

    #[error("Missing front-matter `path` in {file}")]
    MissingPath { file: String },

    #[error("Invalid front-matter `path` {path:?} in {file}: segments must not be empty, `.` or `..`")]
    InvalidPath { file: String, path: String },

    #[error("Duplicate path {path:?} in {first} and {second}")]
    DuplicatePath {
        path: String,
        first: String,
        second: String,
    },

    #[error("Failed to render markdown in {file}: {message}")]
    Markdown { file: String, message: String },
}

/// Immutable, ordered collection of content nodes
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    nodes: Vec<ContentNode>,
    by_path: HashMap<String, usize>,
}

impl ContentStore {
    /// Load every markdown document under the site's source dir
    pub fn load(gazette: &Gazette) -> Result<Self, StoreError> {
        let nodes = ContentLoader::new(gazette).load_nodes()?;
        Self::from_nodes(nodes)
    }

    /// Build a store from nodes, keeping their order and enforcing
    /// unique paths
    pub fn from_nodes(nodes: Vec<ContentNode>) -> Result<Self, StoreError> {
        let mut by_path = HashMap::with_capacity(nodes.len());

        for (i, node) in nodes.iter().enumerate() {
            if let Some(&first) = by_path.get(&node.frontmatter.path) {
                let first: &ContentNode = &nodes[first];
                return Err(StoreError::DuplicatePath {
                    path: node.frontmatter.path.clone(),
                    first: first.source.clone(),
                    second: node.source.clone(),
                });
            }
            by_path.insert(node.frontmatter.path.clone(), i);
        }

        Ok(Self { nodes, by_path })
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> &[ContentNode] {
        &self.nodes
    }

    /// The node whose front-matter `path` equals `path` exactly
    pub fn find_by_path(&self, path: &str) -> Option<&ContentNode> {
        self.by_path.get(path).map(|&i| &self.nodes[i])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Loads content from the source directory
pub struct ContentLoader<'a> {
    gazette: &'a Gazette,
    renderer: MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(gazette: &'a Gazette) -> Self {
        let renderer = MarkdownRenderer::with_options(&gazette.config.highlight);
        Self { gazette, renderer }
    }

    /// Load all markdown documents, ordered by file path
    pub fn load_nodes(&self) -> Result<Vec<ContentNode>, StoreError> {
        let source_dir = &self.gazette.source_dir;
        if !source_dir.exists() {
            tracing::warn!("Source directory {:?} does not exist", source_dir);
            return Ok(Vec::new());
        }

        let mut nodes = Vec::new();

        let entries = WalkDir::new(source_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name().to_str()))
            .filter_map(|e| e.ok());

        for entry in entries {
            let path = entry.path();
            if path.is_file() && is_markdown_file(path) {
                let node = self.load_node(path)?;
                tracing::debug!("Loaded {} -> {}", node.source, node.frontmatter.path);
                nodes.push(node);
            }
        }

        Ok(nodes)
    }

    /// Load a single node from a file
    pub fn load_node(&self, path: &Path) -> Result<ContentNode, StoreError> {
        let source = path
            .strip_prefix(&self.gazette.source_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        let content = fs::read_to_string(path).map_err(|e| StoreError::Io {
            file: path.to_path_buf(),
            source: e,
        })?;

        let (fm, body) = FrontMatter::parse(&content).map_err(|e| StoreError::FrontMatter {
            file: source.clone(),
            message: e.to_string(),
        })?;

        let route = fm
            .path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| StoreError::MissingPath {
                file: source.clone(),
            })?
            .to_string();
        if !is_valid_route(&route) {
            return Err(StoreError::InvalidPath {
                file: source.clone(),
                path: route,
            });
        }

        if fm.date.is_some() && fm.parse_date().is_none() {
            tracing::warn!("Unrecognised date {:?} in {}", fm.date, source);
        }
        let date = fm.parse_date();

        let avatar = fm.avatar.as_deref().map(|avatar| {
            let base = path.parent().unwrap_or(Path::new(""));
            base.join(avatar.trim_start_matches("./"))
        });

        let html = self
            .renderer
            .render(body)
            .map_err(|e| StoreError::Markdown {
                file: source.clone(),
                message: e.to_string(),
            })?;
        let excerpt = MarkdownRenderer::excerpt(body, self.gazette.config.excerpt_length);

        Ok(ContentNode {
            id: format!("{:016x}", hash_content(&source)),
            source,
            html,
            excerpt,
            frontmatter: NodeFrontmatter {
                title: fm.title.unwrap_or_default(),
                author: fm.author.unwrap_or_default(),
                path: route,
                date,
                avatar,
            },
        })
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

/// A route maps onto a directory under the public dir, so it may not climb
/// out of it. `/` alone is accepted here.
fn is_valid_route(route: &str) -> bool {
    let inner = route.strip_prefix('/').unwrap_or(route);
    let inner = inner.strip_suffix('/').unwrap_or(inner);
    if inner.is_empty() {
        return true;
    }
    inner
        .split('/')
        .all(|segment| !matches!(segment, "" | "." | "..") && !segment.contains('\\'))
}

/// Skip `_drafts`, `.git` and friends
fn is_hidden(name: Option<&str>) -> bool {
    name.map(|n| n.starts_with('_') || n.starts_with('.'))
        .unwrap_or(false)
}
