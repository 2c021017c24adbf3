//! Page queries.
//!
//! Each page declares the data it needs as a typed projection over the
//! content store. Queries are resolved once, before any view runs, and the
//! view receives the plain result.

use serde::Serialize;

use crate::content::{ContentNode, ContentStore};
use crate::helpers::format_date;
use crate::images::{FluidImage, ImageIndex};

/// Result of the listing query: every node, in store order
#[derive(Debug, Clone, Serialize)]
pub struct ListingData {
    pub nodes: Vec<ListingNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingNode {
    pub id: String,
    pub excerpt: String,
    pub frontmatter: ListingFrontmatter,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingFrontmatter {
    pub author: String,
    pub path: String,
    pub title: String,
    pub avatar: Option<FluidImage>,
}

/// Result of the detail query for one routing key
#[derive(Debug, Clone, Serialize)]
pub struct DetailData {
    /// The key the page was created for
    pub path: String,
    /// `None` when no node has that path
    pub node: Option<DetailNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailNode {
    pub html: String,
    pub frontmatter: DetailFrontmatter,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailFrontmatter {
    /// Formatted with the site's date format; empty when the post has no date
    pub date: String,
    pub path: String,
    pub title: String,
    pub avatar: Option<FluidImage>,
}

fn avatar_of(node: &ContentNode, images: &ImageIndex) -> Option<FluidImage> {
    node.frontmatter
        .avatar
        .as_deref()
        .and_then(|source| images.get(source))
        .cloned()
}

/// All nodes with the fields the listing page shows
pub fn listing(store: &ContentStore, images: &ImageIndex) -> ListingData {
    let nodes = store
        .nodes()
        .iter()
        .map(|node| ListingNode {
            id: node.id.clone(),
            excerpt: node.excerpt.clone(),
            frontmatter: ListingFrontmatter {
                author: node.frontmatter.author.clone(),
                path: node.frontmatter.path.clone(),
                title: node.frontmatter.title.clone(),
                avatar: avatar_of(node, images),
            },
        })
        .collect();

    ListingData { nodes }
}

/// The node whose `path` equals `path`, with the fields the detail page shows
pub fn detail(
    store: &ContentStore,
    images: &ImageIndex,
    date_format: &str,
    path: &str,
) -> DetailData {
    let node = store.find_by_path(path).map(|node| DetailNode {
        html: node.html.clone(),
        frontmatter: DetailFrontmatter {
            date: node
                .frontmatter
                .date
                .as_ref()
                .map(|d| format_date(d, date_format))
                .unwrap_or_default(),
            path: node.frontmatter.path.clone(),
            title: node.frontmatter.title.clone(),
            avatar: avatar_of(node, images),
        },
    });

    DetailData {
        path: path.to_string(),
        node,
    }
}
