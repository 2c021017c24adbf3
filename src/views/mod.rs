//! Page views rendered with embedded Tera templates.
//!
//! A view is a pure function from a resolved query result to an HTML
//! string. Text fields are HTML-escaped; the markdown body of a post is
//! trusted build-time output and is inserted as-is.

mod detail;
mod listing;

use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};
use thiserror::Error;

use crate::config::SiteConfig;
use crate::helpers::{full_url_for, html_escape, url_for};
use crate::styles::{ScopedStyles, StyleError};

/// CSS module of the listing page
pub const LISTING_STYLES: (&str, &str) = ("index", include_str!("styles/index.module.css"));

/// CSS module of the post page
pub const DETAIL_STYLES: (&str, &str) = (
    "blog-template",
    include_str!("styles/blog-template.module.css"),
);

/// View rendering errors
#[derive(Error, Debug)]
pub enum ViewError {
    #[error("No content node matches path {path:?}")]
    MissingNode { path: String },

    #[error("Content node {path:?} has no processed avatar image")]
    MissingAvatar { path: String },

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error(transparent)]
    Style(#[from] StyleError),
}

/// Site-wide values every page template sees
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
}

impl From<&SiteConfig> for SiteData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
        }
    }
}

/// Template renderer for the listing and detail views
pub struct Views {
    tera: Tera,
    config: SiteConfig,
    site: SiteData,
    listing_styles: ScopedStyles,
    detail_styles: ScopedStyles,
}

impl Views {
    /// Load the embedded templates and compile both style modules
    pub fn new(config: &SiteConfig) -> Result<Self, ViewError> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("templates/layout.html")),
            ("macros.html", include_str!("templates/macros.html")),
            ("index.html", include_str!("templates/index.html")),
            ("post.html", include_str!("templates/post.html")),
        ])?;

        // Tera's default escaper also rewrites `/`, which would mangle hrefs
        tera.autoescape_on(vec![".html"]);
        tera.set_escape_fn(html_escape);

        let url_config = config.clone();
        tera.register_filter(
            "url_for",
            move |value: &tera::Value, _args: &HashMap<String, tera::Value>| {
                let path = tera::try_get_value!("url_for", "value", String, value);
                Ok(tera::Value::String(url_for(&url_config, &path)))
            },
        );
        tera.register_filter("padding_ratio", padding_ratio_filter);

        Ok(Self {
            tera,
            config: config.clone(),
            site: SiteData::from(config),
            listing_styles: ScopedStyles::compile(LISTING_STYLES.0, LISTING_STYLES.1)?,
            detail_styles: ScopedStyles::compile(DETAIL_STYLES.0, DETAIL_STYLES.1)?,
        })
    }

    /// Every stylesheet the views link to
    pub fn stylesheets(&self) -> [&ScopedStyles; 2] {
        [&self.listing_styles, &self.detail_styles]
    }

    /// Context shared by both views
    fn base_context(&self, styles: &ScopedStyles, page_title: &str, route: &str) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert("page_title", page_title);
        context.insert("canonical_url", &full_url_for(&self.config, route));
        context.insert("generator_version", env!("CARGO_PKG_VERSION"));
        context.insert("stylesheet", &url_for(&self.config, &styles.file_name()));
        context.insert("style", styles.classes());
        context
    }

    fn render(&self, template_name: &str, context: &Context) -> Result<String, ViewError> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: aspect ratio -> `padding-bottom` percentage that reserves
/// the image's height before it loads
fn padding_ratio_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let ratio = tera::try_get_value!("padding_ratio", "value", f64, value);
    if ratio <= 0.0 {
        return Err(tera::Error::msg("padding_ratio needs a positive aspect ratio"));
    }
    let percent = format!("{:.4}", 100.0 / ratio);
    let percent = percent.trim_end_matches('0').trim_end_matches('.');
    Ok(tera::Value::String(format!("{}%", percent)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::images::FluidImage;
    use crate::query::{ListingFrontmatter, ListingNode};

    pub fn image() -> FluidImage {
        FluidImage {
            aspect_ratio: 2.0,
            src: "/static/abc/250/hello.png".to_string(),
            src_set: "/static/abc/63/hello.png 63w,\n/static/abc/250/hello.png 250w".to_string(),
            sizes: "(max-width: 250px) 100vw, 250px".to_string(),
            presentation_width: 250,
            placeholder: Some("#336699".to_string()),
        }
    }

    pub fn listing_node(id: &str, title: &str, author: &str, path: &str, excerpt: &str) -> ListingNode {
        ListingNode {
            id: id.to_string(),
            excerpt: excerpt.to_string(),
            frontmatter: ListingFrontmatter {
                author: author.to_string(),
                path: path.to_string(),
                title: title.to_string(),
                avatar: Some(image()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_ratio() {
        let value = |v: f64| {
            padding_ratio_filter(&tera::Value::from(v), &HashMap::new())
                .unwrap()
                .as_str()
                .unwrap()
                .to_string()
        };
        assert_eq!(value(2.0), "50%");
        assert_eq!(value(1.5), "66.6667%");
        assert_eq!(value(0.5), "200%");
        assert!(padding_ratio_filter(&tera::Value::from(0.0), &HashMap::new()).is_err());
    }

    #[test]
    fn test_stylesheets_define_template_classes() {
        let views = Views::new(&SiteConfig::default()).unwrap();
        let [listing, detail] = views.stylesheets();
        for class in ["content", "header", "blogcard", "image"] {
            assert!(listing.class(class).is_some(), "listing .{class}");
        }
        for class in ["article", "title", "image", "date", "body"] {
            assert!(detail.class(class).is_some(), "detail .{class}");
        }
    }
}
