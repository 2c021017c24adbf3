//! Scoped stylesheets (CSS modules).
//!
//! Every class selector in a module's stylesheet is renamed to
//! `<module>-module--<class>--<hash>`, so two views can both style a
//! `.header` without colliding. A view receives the `class -> scoped name`
//! map of its own module only. `:global(...)` opts a selector out.

use lightningcss::css_modules::{self, Pattern};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StyleError {
    #[error("Invalid scoping pattern for {module}: {message}")]
    Pattern { module: String, message: String },

    #[error("Failed to parse {module}.module.css: {message}")]
    Parse { module: String, message: String },

    #[error("Failed to print {module}.module.css: {message}")]
    Print { module: String, message: String },
}

/// A compiled CSS module
#[derive(Debug, Clone)]
pub struct ScopedStyles {
    name: String,
    classes: BTreeMap<String, String>,
    css: String,
}

impl ScopedStyles {
    /// Scope every class selector in `source` under module `name`
    pub fn compile(name: &str, source: &str) -> Result<Self, StyleError> {
        let pattern_source = format!("{}-module--[local]--[hash]", name);
        let pattern = Pattern::parse(&pattern_source).map_err(|e| StyleError::Pattern {
            module: name.to_string(),
            message: e.to_string(),
        })?;

        let options = ParserOptions {
            // The hash is derived from the file name, one per module
            filename: format!("{}.module.css", name),
            css_modules: Some(css_modules::Config {
                pattern,
                ..Default::default()
            }),
            ..ParserOptions::default()
        };

        let stylesheet = StyleSheet::parse(source, options).map_err(|e| StyleError::Parse {
            module: name.to_string(),
            message: e.to_string(),
        })?;
        let result = stylesheet
            .to_css(PrinterOptions::default())
            .map_err(|e| StyleError::Print {
                module: name.to_string(),
                message: e.to_string(),
            })?;

        let classes = result
            .exports
            .unwrap_or_default()
            .into_iter()
            .map(|(local, export)| (local, export.name))
            .collect();

        Ok(Self {
            name: name.to_string(),
            classes,
            css: result.code,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scoped name for a local class
    pub fn class(&self, local: &str) -> Option<&str> {
        self.classes.get(local).map(String::as_str)
    }

    /// `local -> scoped` map handed to templates
    pub fn classes(&self) -> &BTreeMap<String, String> {
        &self.classes
    }

    /// The rewritten stylesheet
    pub fn css(&self) -> &str {
        &self.css
    }

    /// Output path of the stylesheet, relative to the public dir
    pub fn file_name(&self) -> String {
        format!("styles/{}.module.css", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(source: &str) -> ScopedStyles {
        ScopedStyles::compile("m", source).unwrap()
    }

    #[test]
    fn test_classes_are_scoped() {
        let styles = ScopedStyles::compile("index", ".header { color: red; }").unwrap();
        let scoped = styles.class("header").unwrap();
        assert!(scoped.starts_with("index-module--header--"));
        assert!(scoped.len() > "index-module--header--".len());
        assert!(styles.css().contains(&format!(".{} {{", scoped)));
        assert!(!styles.css().contains(".header {"));
    }

    #[test]
    fn test_same_class_different_modules() {
        let a = ScopedStyles::compile("index", ".header { margin: 0; }").unwrap();
        let b = ScopedStyles::compile("blog-template", ".header { margin: 0; }").unwrap();
        assert_ne!(a.class("header"), b.class("header"));
    }

    #[test]
    fn test_compile_is_deterministic() {
        let source = ".a .b, .c:hover > .a { margin: 0; }";
        let first = compile(source);
        let second = compile(source);
        assert_eq!(first.css(), second.css());
        assert_eq!(first.classes(), second.classes());
        assert_eq!(first.classes().len(), 3);
    }

    #[test]
    fn test_declarations_untouched() {
        let styles = compile(".card { background: url(img/bg.png); width: 1.5rem; }");
        assert!(styles.css().contains("img/bg.png"));
        assert!(styles.css().contains("1.5rem"));
        assert_eq!(styles.classes().len(), 1);
    }

    #[test]
    fn test_attribute_selectors_untouched() {
        let styles = compile(r#"a[href$=".pdf"] { color: red; }"#);
        assert!(styles.css().contains(r#"[href$=".pdf"]"#));
        assert!(styles.classes().is_empty());
    }

    #[test]
    fn test_strings_with_css_punctuation() {
        let styles = compile(r#".quote::before { content: ".a { b; }"; }"#);
        assert_eq!(styles.classes().keys().collect::<Vec<_>>(), vec!["quote"]);
        assert!(styles.css().contains(r#"".a { b; }""#));
    }

    #[test]
    fn test_media_queries_scope_nested_rules() {
        let styles = compile("@media (max-width: 600px) { .card { padding: 0; } }");
        assert!(styles.css().starts_with("@media"));
        let card = styles.class("card").unwrap();
        assert!(styles.css().contains(&format!(".{} {{", card)));
    }

    #[test]
    fn test_global_escape_hatch() {
        let styles = compile(":global(.fluid-image) .card { margin: 0; }");
        assert!(styles.css().starts_with(".fluid-image ."));
        assert!(styles.class("fluid-image").is_none());
        assert!(styles.class("card").is_some());
    }

    #[test]
    fn test_comments_removed() {
        let styles = compile("/* .ghost { margin: 0; } */ .real { margin: 0; }");
        assert!(styles.class("ghost").is_none());
        assert!(styles.class("real").is_some());
    }

    #[test]
    fn test_file_name() {
        let styles = ScopedStyles::compile("index", "").unwrap();
        assert_eq!(styles.file_name(), "styles/index.module.css");
    }
}
