//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::Gazette;

/// Remove the public directory and everything generated into it
pub fn run(gazette: &Gazette) -> Result<()> {
    if gazette.public_dir.exists() {
        fs::remove_dir_all(&gazette.public_dir)?;
        tracing::info!("Deleted: {:?}", gazette.public_dir);
    }

    Ok(())
}
