//! List site content

use anyhow::Result;

use crate::content::ContentStore;
use crate::Gazette;

/// One line per post: path, title and author, in store order
pub fn lines(store: &ContentStore) -> Vec<String> {
    store
        .nodes()
        .iter()
        .map(|node| {
            let fm = &node.frontmatter;
            if fm.author.is_empty() {
                format!("  {} - {} [{}]", fm.path, fm.title, node.source)
            } else {
                format!("  {} - {} by {} [{}]", fm.path, fm.title, fm.author, node.source)
            }
        })
        .collect()
}

/// Print every post
pub fn run(gazette: &Gazette) -> Result<()> {
    let store = ContentStore::load(gazette)?;

    println!("Posts ({}):", store.len());
    for line in lines(&store) {
        println!("{}", line);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_lines() {
        let dir = TempDir::new().unwrap();
        let gazette = Gazette::new(dir.path()).unwrap();
        fs::create_dir_all(&gazette.source_dir).unwrap();
        fs::write(
            gazette.source_dir.join("a.md"),
            "---\ntitle: Hello\nauthor: Jane\npath: /hello\n---\n",
        )
        .unwrap();
        fs::write(
            gazette.source_dir.join("b.md"),
            "---\ntitle: Anonymous\npath: /anon\n---\n",
        )
        .unwrap();

        let store = ContentStore::load(&gazette).unwrap();
        assert_eq!(
            lines(&store),
            vec![
                "  /hello - Hello by Jane [a.md]".to_string(),
                "  /anon - Anonymous [b.md]".to_string(),
            ]
        );
    }
}
