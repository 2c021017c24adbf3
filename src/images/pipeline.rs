//! Image pipeline - derives fluid renditions for every avatar in the store

use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use super::backend::{ImageBackend, ImageError, ResizeParams, RustBackend};
use super::fluid::{self, FluidImage};
use crate::config::SiteConfig;
use crate::content::ContentStore;
use crate::helpers::{encode_path, hash_bytes, url_for};

/// Output folder for renditions, relative to the public dir
const STATIC_DIR: &str = "static";

/// Resolved fluid images keyed by source file
#[derive(Debug, Clone, Default)]
pub struct ImageIndex {
    images: HashMap<PathBuf, FluidImage>,
}

impl ImageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: PathBuf, image: FluidImage) {
        self.images.insert(source, image);
    }

    pub fn get(&self, source: &Path) -> Option<&FluidImage> {
        self.images.get(source)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Turns source images into [`FluidImage`]s and writes their renditions
pub struct ImagePipeline<B: ImageBackend = RustBackend> {
    backend: B,
    config: SiteConfig,
    public_dir: PathBuf,
}

impl ImagePipeline<RustBackend> {
    pub fn new(config: &SiteConfig, public_dir: &Path) -> Self {
        Self::with_backend(RustBackend::new(), config, public_dir)
    }
}

impl<B: ImageBackend> ImagePipeline<B> {
    pub fn with_backend(backend: B, config: &SiteConfig, public_dir: &Path) -> Self {
        Self {
            backend,
            config: config.clone(),
            public_dir: public_dir.to_path_buf(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Process every distinct avatar referenced by the store.
    ///
    /// Failures are logged and leave the avatar out of the index; pages
    /// that need it fail when they render.
    pub fn process_store(&self, store: &ContentStore) -> ImageIndex {
        let sources: BTreeSet<&PathBuf> = store
            .nodes()
            .iter()
            .filter_map(|n| n.frontmatter.avatar.as_ref())
            .collect();

        // Sources sharing an output location are processed once, so no two
        // jobs write the same rendition
        let mut index = ImageIndex::new();
        let mut groups: BTreeMap<(String, String), Vec<&PathBuf>> = BTreeMap::new();
        for source in sources {
            match output_key(source) {
                Ok(key) => groups.entry(key).or_default().push(source),
                Err(e) => tracing::warn!("Failed to process image {:?}: {}", source, e),
            }
        }

        let results: Vec<_> = groups
            .into_values()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|group| {
                let result = self.process(group[0]);
                (group, result)
            })
            .collect();

        for (group, result) in results {
            match result {
                Ok(image) => {
                    for source in group {
                        index.insert(source.clone(), image.clone());
                    }
                }
                Err(e) => tracing::warn!("Failed to process image {:?}: {}", group[0], e),
            }
        }

        tracing::info!("Processed {} images", index.len());
        index
    }

    /// Derive the fluid image for one source file
    pub fn process(&self, source: &Path) -> Result<FluidImage, ImageError> {
        if !source.is_file() {
            return Err(ImageError::NotFound(source.to_path_buf()));
        }

        let dims = self.backend.identify(source)?;
        if dims.width == 0 || dims.height == 0 {
            return Err(ImageError::Decode {
                path: source.to_path_buf(),
                message: "image has no pixels".to_string(),
            });
        }

        let (digest, file_name) = output_key(source)?;

        let max_width = self.config.image.max_width;
        let renditions = fluid::renditions(max_width, (dims.width, dims.height));

        let mut urls = Vec::with_capacity(renditions.len());
        for rendition in &renditions {
            let rel = format!("{}/{}/{}/{}", STATIC_DIR, digest, rendition.width, file_name);
            let output = self.public_dir.join(&rel);

            // Renditions are content-addressed, so an existing file is current
            if !output.exists() {
                self.backend.resize(&ResizeParams {
                    source: source.to_path_buf(),
                    output,
                    width: rendition.width,
                    height: rendition.height,
                    quality: self.config.image.quality,
                })?;
                tracing::debug!("Wrote {}", rel);
            }

            urls.push(url_for(&self.config, &encode_path(&rel)));
        }

        let fallback = fluid::closest_to(&renditions, max_width).unwrap_or(0);
        let presentation_width = max_width.min(dims.width);

        let placeholder = match self.backend.dominant_color(source) {
            Ok(color) => Some(fluid::hex_color(color)),
            Err(e) => {
                tracing::debug!("No placeholder for {:?}: {}", source, e);
                None
            }
        };

        Ok(FluidImage {
            aspect_ratio: dims.width as f64 / dims.height as f64,
            src: urls[fallback].clone(),
            src_set: fluid::src_set_attr(
                urls.iter()
                    .map(String::as_str)
                    .zip(renditions.iter().map(|r| r.width)),
            ),
            sizes: fluid::sizes_attr(presentation_width),
            presentation_width,
            placeholder,
        })
    }
}

/// Content digest and file name; together they fix a source's rendition paths
fn output_key(source: &Path) -> Result<(String, String), ImageError> {
    if !source.is_file() {
        return Err(ImageError::NotFound(source.to_path_buf()));
    }
    let digest = format!("{:016x}", hash_bytes(&fs::read(source)?));
    let file_name = source
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();
    Ok((digest, file_name))
}
