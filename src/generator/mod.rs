//! Generator module - builds the public site from the content store

use anyhow::{Context as _, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::content::ContentStore;
use crate::images::{ImageIndex, ImagePipeline};
use crate::query;
use crate::views::Views;
use crate::Gazette;

/// Static site generator
pub struct Generator {
    gazette: Gazette,
    views: Views,
}

impl Generator {
    /// Create a new generator
    pub fn new(gazette: &Gazette) -> Result<Self> {
        let views = Views::new(&gazette.config)?;

        Ok(Self {
            gazette: gazette.clone(),
            views,
        })
    }

    /// Generate the entire site
    pub fn generate(&self) -> Result<()> {
        fs::create_dir_all(&self.gazette.public_dir)?;

        let store = ContentStore::load(&self.gazette)?;
        tracing::info!("Loaded {} posts", store.len());

        if let Some(node) = store
            .nodes()
            .iter()
            .find(|n| n.frontmatter.path.trim_matches('/').is_empty())
        {
            anyhow::bail!(
                "{}: path {:?} would overwrite the listing page",
                node.source,
                node.frontmatter.path
            );
        }

        let images = ImagePipeline::new(&self.gazette.config, &self.gazette.public_dir)
            .process_store(&store);

        self.write_stylesheets()?;
        self.generate_post_pages(&store, &images)?;
        self.generate_index_page(&store, &images)?;
        self.copy_source_assets()?;

        Ok(())
    }

    /// Write the scoped stylesheet of every view
    fn write_stylesheets(&self) -> Result<()> {
        for styles in self.views.stylesheets() {
            let output_path = self.gazette.public_dir.join(styles.file_name());
            write_file(&output_path, styles.css())?;
            tracing::debug!("Generated stylesheet: {:?}", output_path);
        }
        Ok(())
    }

    /// Generate one page per node
    fn generate_post_pages(&self, store: &ContentStore, images: &ImageIndex) -> Result<()> {
        let date_format = &self.gazette.config.date_format;

        for node in store.nodes() {
            let data = query::detail(store, images, date_format, &node.frontmatter.path);
            let html = self
                .views
                .render_detail(&data)
                .with_context(|| format!("Failed to render {}", node.source))?;

            let output_path = self.gazette.public_dir.join(node.output_path());
            write_file(&output_path, &html)?;
            tracing::debug!("Generated post: {:?}", output_path);
        }

        Ok(())
    }

    /// Generate the listing page
    fn generate_index_page(&self, store: &ContentStore, images: &ImageIndex) -> Result<()> {
        let data = query::listing(store, images);
        let html = self
            .views
            .render_listing(&data)
            .context("Failed to render the listing page")?;

        let output_path = self.gazette.public_dir.join("index.html");
        write_file(&output_path, &html)?;
        tracing::debug!("Generated index: {:?}", output_path);

        Ok(())
    }

    /// Copy non-markdown source files (images, etc.) to the public directory
    fn copy_source_assets(&self) -> Result<()> {
        let source_dir = &self.gazette.source_dir;
        if !source_dir.exists() {
            return Ok(());
        }

        let entries = WalkDir::new(source_dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !e
                        .file_name()
                        .to_str()
                        .map(|n| n.starts_with('_') || n.starts_with('.'))
                        .unwrap_or(false)
            })
            .filter_map(|e| e.ok());

        for entry in entries {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str());
            if matches!(ext, Some("md") | Some("markdown")) {
                continue;
            }

            let relative = path.strip_prefix(source_dir)?;
            let dest = self.gazette.public_dir.join(relative);

            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::copy(path, &dest)
                .with_context(|| format!("Failed to copy {:?} to {:?}", path, dest))?;
        }

        Ok(())
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create dir {:?}", parent))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))
}
