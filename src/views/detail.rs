//! Detail view - a single post

use super::{ViewError, Views};
use crate::query::DetailData;

impl Views {
    /// Render the page of the node resolved for `data.path`.
    ///
    /// The node's `html` is inserted without escaping; it comes from the
    /// markdown renderer at build time and must be sanitized upstream if the
    /// sources are not trusted.
    pub fn render_detail(&self, data: &DetailData) -> Result<String, ViewError> {
        let node = data.node.as_ref().ok_or_else(|| ViewError::MissingNode {
            path: data.path.clone(),
        })?;
        if node.frontmatter.avatar.is_none() {
            return Err(ViewError::MissingAvatar {
                path: data.path.clone(),
            });
        }

        let page_title = if node.frontmatter.title.is_empty() {
            self.site.title.clone()
        } else {
            format!("{} | {}", node.frontmatter.title, self.site.title)
        };

        let mut context = self.base_context(&self.detail_styles, &page_title, &data.path);
        context.insert("node", node);

        self.render("post.html", &context)
    }
}
