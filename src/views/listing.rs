//! Listing view - one summary card per post

use tera::Context;

use super::{ViewError, Views};
use crate::query::ListingData;

impl Views {
    /// Render the home page: a card per node, in the order given
    pub fn render_listing(&self, data: &ListingData) -> Result<String, ViewError> {
        if let Some(node) = data.nodes.iter().find(|n| n.frontmatter.avatar.is_none()) {
            return Err(ViewError::MissingAvatar {
                path: node.frontmatter.path.clone(),
            });
        }

        let mut context: Context =
            self.base_context(&self.listing_styles, &self.site.title, "/");
        context.insert("nodes", &data.nodes);

        self.render("index.html", &context)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::listing_node;
    use super::*;
    use crate::config::SiteConfig;

    fn views() -> Views {
        Views::new(&SiteConfig::default()).unwrap()
    }

    fn hello() -> ListingData {
        ListingData {
            nodes: vec![listing_node("n1", "Hello", "Jane", "/hello", "Hi there")],
        }
    }

    #[test]
    fn test_card_for_node() {
        let html = views().render_listing(&hello()).unwrap();
        assert!(html.contains(r#"<a href="/hello">Hello</a>"#));
        assert!(html.contains("<p>Jane</p>"));
        assert!(html.contains("<p>Hi there</p>"));
        assert!(html.contains(r#"data-key="n1""#));
        assert!(html.contains(r#"srcset="/static/abc/63/hello.png 63w,"#));
        assert!(html.contains(r#"src="/static/abc/250/hello.png""#));
        assert!(html.contains("padding-bottom: 50%;"));
        assert!(html.contains("background-color: #336699;"));
    }

    #[test]
    fn test_one_card_per_node_in_order() {
        let data = ListingData {
            nodes: vec![
                listing_node("c", "Charlie", "C", "/c", "third"),
                listing_node("a", "Alpha", "A", "/a", "first"),
                listing_node("b", "Bravo", "B", "/b", "second"),
            ],
        };
        let views = views();
        let html = views.render_listing(&data).unwrap();
        let card_class = views.listing_styles.class("blogcard").unwrap();

        assert_eq!(html.matches(&format!(r#"class="{}""#, card_class)).count(), 3);
        let c = html.find(r#"href="/c""#).unwrap();
        let a = html.find(r#"href="/a""#).unwrap();
        let b = html.find(r#"href="/b""#).unwrap();
        assert!(c < a && a < b);
    }

    #[test]
    fn test_empty_listing() {
        let views = views();
        let html = views.render_listing(&ListingData { nodes: vec![] }).unwrap();
        let card_class = views.listing_styles.class("blogcard").unwrap();
        assert!(!html.contains(card_class));
        assert!(html.contains("Gazette Blog</h1>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let data = ListingData {
            nodes: vec![listing_node("n", "Tom & Jerry", "<b>Ann</b>", "/t", "a < b")],
        };
        let html = views().render_listing(&data).unwrap();
        assert!(html.contains(">Tom &amp; Jerry</a>"));
        assert!(html.contains("<p>&lt;b&gt;Ann&lt;/b&gt;</p>"));
        assert!(html.contains("<p>a &lt; b</p>"));
    }

    #[test]
    fn test_links_use_root_prefix() {
        let mut config = SiteConfig::default();
        config.root = "/blog/".to_string();
        let html = Views::new(&config).unwrap().render_listing(&hello()).unwrap();
        assert!(html.contains(r#"<a href="/blog/hello">Hello</a>"#));
        assert!(html.contains(r#"href="/blog/styles/index.module.css""#));
    }

    #[test]
    fn test_scoped_classes_applied() {
        let views = views();
        let html = views.render_listing(&hello()).unwrap();
        let header = views.listing_styles.class("header").unwrap();
        assert!(html.contains(&format!(r#"class="{}""#, header)));
        assert!(html.contains(r#"style="width: 120px;""#));
    }

    #[test]
    fn test_missing_avatar_fails() {
        let mut data = hello();
        data.nodes[0].frontmatter.avatar = None;
        let err = views().render_listing(&data).unwrap_err();
        assert!(matches!(err, ViewError::MissingAvatar { ref path } if path == "/hello"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let views = views();
        let first = views.render_listing(&hello()).unwrap();
        let second = views.render_listing(&hello()).unwrap();
        assert_eq!(first, second);
    }
}
