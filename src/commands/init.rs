//! Initialize a new site

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::Gazette;

const DEFAULT_CONFIG: &str = r#"# Gazette configuration

# Site
title: Gazette Blog
description: ''
author: ''
language: en

# URL
url: http://example.com
root: /

# Directory
source_dir: content
public_dir: public

# Writing
date_format: MMM DD, YYYY
excerpt_length: 140
highlight:
  theme: base16-ocean.dark
  line_number: true

# Images
image:
  max_width: 250
  quality: 80
"#;

const SAMPLE_POST: &str = r#"Welcome to your new blog! Every post lives in its own folder under
`content/`, next to the image it uses as its avatar.

<!-- more -->

## Quick Start

### Create a new post

```bash
$ gazette new "My New Post"
```

### Run server

```bash
$ gazette server
```

### Generate static files

```bash
$ gazette generate
```
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("{:?} already contains a site", target_dir);
    }

    let post_dir = target_dir.join("content/hello-world");
    fs::create_dir_all(&post_dir)?;

    fs::write(&config_path, DEFAULT_CONFIG)?;

    let date = chrono::Local::now().format("%Y-%m-%d");
    let post = format!(
        "---\ntitle: Hello World\nauthor: ''\npath: /hello-world\ndate: {}\navatar: ./avatar.png\n---\n\n{}",
        date, SAMPLE_POST
    );
    fs::write(post_dir.join("index.md"), post)?;

    write_sample_avatar(&post_dir.join("avatar.png"))?;

    Ok(())
}

/// Write a placeholder avatar (a diagonal gradient PNG)
pub fn write_sample_avatar(path: &Path) -> Result<()> {
    const WIDTH: u32 = 600;
    const HEIGHT: u32 = 400;

    let img = image::RgbImage::from_fn(WIDTH, HEIGHT, |x, y| {
        let t = (x + y) as f32 / (WIDTH + HEIGHT) as f32;
        image::Rgb([
            (40.0 + 180.0 * t) as u8,
            (90.0 + 60.0 * t) as u8,
            (160.0 - 100.0 * t) as u8,
        ])
    });
    img.save(path)
        .with_context(|| format!("Failed to write {:?}", path))
}

/// Run the init command with an existing site
pub fn run(gazette: &Gazette) -> Result<()> {
    init_site(&gazette.base_dir)
}
