//! Generate static files

use anyhow::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use std::path::Path;
use std::time::Duration;

use crate::generator::Generator;
use crate::Gazette;

/// Quiet period after the last change before rebuilding
const DEBOUNCE: Duration = Duration::from_millis(500);

/// Build the whole site
pub fn run(gazette: &Gazette) -> Result<()> {
    let start = std::time::Instant::now();

    Generator::new(gazette)?.generate()?;

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}

/// Watch for file changes and regenerate
pub async fn watch(gazette: &Gazette) -> Result<()> {
    let gazette = gazette.clone();
    tracing::info!("Watching for changes. Press Ctrl+C to stop.");
    tokio::task::spawn_blocking(move || watch_changes(&gazette, |_| true)).await?
}

/// Rebuild after every debounced batch of changes to the sources or the
/// config. `on_rebuilt` runs after each successful build and returns
/// whether to keep watching. Blocks the calling thread.
pub(crate) fn watch_changes<F>(gazette: &Gazette, mut on_rebuilt: F) -> Result<()>
where
    F: FnMut(&Gazette) -> bool,
{
    let source_dir = &gazette.source_dir;
    let config_path = gazette.base_dir.join("_config.yml");

    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(DEBOUNCE, tx)?;

    if source_dir.exists() {
        debouncer
            .watcher()
            .watch(source_dir, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", source_dir);
    }

    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    for result in rx {
        let events = match result {
            Ok(events) => events,
            Err(e) => {
                tracing::error!("Watch error: {:?}", e);
                continue;
            }
        };

        let changed: Vec<_> = events
            .iter()
            .map(|e| &e.path)
            .filter(|p| is_relevant(p))
            .collect();
        if changed.is_empty() {
            continue;
        }
        for path in &changed {
            tracing::info!("Changed: {}", path.display());
        }

        // Config edits apply to the next build
        let rebuilt = Gazette::new(&gazette.base_dir).and_then(|g| run(&g).map(|_| g));
        match rebuilt {
            Ok(current) => {
                if !on_rebuilt(&current) {
                    break;
                }
            }
            Err(e) => tracing::error!("Generation failed: {:#}", e),
        }
    }

    Ok(())
}

/// Editor swap files and VCS noise do not trigger a rebuild
fn is_relevant(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.ends_with('~')
        && !path_str.ends_with(".swp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init::init_site;
    use std::fs;
    use std::sync::mpsc;
    use tempfile::TempDir;

    #[test]
    fn test_is_relevant() {
        assert!(is_relevant(Path::new("content/hello/index.md")));
        assert!(is_relevant(Path::new("_config.yml")));
        assert!(!is_relevant(Path::new("content/.git/index")));
        assert!(!is_relevant(Path::new("content/hello/index.md~")));
        assert!(!is_relevant(Path::new("content/hello/.index.md.swp")));
    }

    #[test]
    fn test_watch_rebuilds_with_last_save_of_a_burst() {
        let dir = TempDir::new().unwrap();
        init_site(dir.path()).unwrap();
        let gazette = Gazette::new(dir.path()).unwrap();
        run(&gazette).unwrap();

        let (done_tx, done_rx) = mpsc::channel();
        let watched = gazette.clone();
        std::thread::spawn(move || {
            watch_changes(&watched, |g| {
                let index = fs::read_to_string(g.public_dir.join("index.html")).unwrap_or_default();
                if index.contains("Second edit") {
                    let _ = done_tx.send(());
                    return false;
                }
                true
            })
        });
        std::thread::sleep(Duration::from_millis(500));

        let post = gazette.source_dir.join("hello-world/index.md");
        let original = fs::read_to_string(&post).unwrap();
        fs::write(&post, original.replace("Hello World", "First edit")).unwrap();
        fs::write(&post, original.replace("Hello World", "Second edit")).unwrap();

        done_rx
            .recv_timeout(Duration::from_secs(20))
            .expect("the last edit was never rebuilt");
    }
}
