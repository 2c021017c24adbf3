//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use super::init::write_sample_avatar;
use crate::content::FrontMatter;
use crate::Gazette;

const AVATAR_FILE: &str = "avatar.png";

/// Scaffold `<source>/<slug>/index.md` with a placeholder avatar.
///
/// `author` falls back to the site author and `path` to `/<slug>`.
pub fn create_post(
    gazette: &Gazette,
    title: &str,
    author: Option<&str>,
    path: Option<&str>,
) -> Result<PathBuf> {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a folder name from title {:?}", title);
    }

    let route = match path {
        Some(p) => format!("/{}", p.trim_start_matches('/')),
        None => format!("/{}", slug),
    };

    let target_dir = gazette.source_dir.join(&slug);
    let file_path = target_dir.join("index.md");
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let front_matter = FrontMatter {
        title: Some(title.to_string()),
        author: Some(author.unwrap_or(&gazette.config.author).to_string()),
        path: Some(route),
        date: Some(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        avatar: Some(format!("./{}", AVATAR_FILE)),
        ..Default::default()
    };
    let yaml = serde_yaml::to_string(&front_matter)?;

    fs::create_dir_all(&target_dir)?;
    fs::write(&file_path, format!("---\n{}---\n\n", yaml))?;

    let avatar = target_dir.join(AVATAR_FILE);
    if !avatar.exists() {
        write_sample_avatar(&avatar)?;
    }

    println!("Created: {:?}", file_path);

    Ok(file_path)
}
