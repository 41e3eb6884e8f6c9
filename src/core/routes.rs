//! Route pattern override engine.
//!
//! Author patterns map a route template (`/blog/[slug]`) to a page file.
//! Users may remove a pattern or rename it, as long as every parameter
//! segment stays in the same position.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    error::{ThemeError, ThemeResult},
    infra::{
        path::{PAGE_FORMATS, PatternUtils, SlashUtils},
        walk::FileWalker,
    },
};

/// What a user asked for one author pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOverride
{
    Keep,
    Remove,
    Rename(String),
}

impl PageOverride
{
    /// Falsy values remove, non-empty strings rename, anything else keeps.
    pub fn classify(value: &Value) -> Self
    {
        match value
        {
            Value::Null | Value::Bool(false) => Self::Remove,
            Value::String(pattern) if pattern.is_empty() => Self::Remove,
            Value::String(pattern) => Self::Rename(pattern.clone()),
            Value::Number(n) if n.as_f64() == Some(0.0) => Self::Remove,
            _ => Self::Keep,
        }
    }
}

/// Route handed to the host for injection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InjectedRoute
{
    pub pattern: String,
    pub entrypoint: Utf8PathBuf,
}

/// Result of applying user page overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageOverrideOutcome
{
    /// Final route table, in the author's pattern order
    pub patterns: IndexMap<String, Utf8PathBuf>,

    /// Renamed patterns, old to new, in override order
    pub override_log: IndexMap<String, String>,

    /// Every author pattern and what became of it (`None` means removed)
    pub resolved: IndexMap<String, Option<String>>,
}

impl PageOverrideOutcome
{
    pub fn injected_routes(&self) -> Vec<InjectedRoute>
    {
        self.patterns
            .iter()
            .map(|(pattern, entrypoint)| InjectedRoute {
                pattern: pattern.clone(),
                entrypoint: entrypoint.clone(),
            })
            .collect()
    }
}

/// Normalize a replacement pattern (one leading slash, no trailing slash)
/// and check it keeps the parameter shape of `old`.
pub fn normalize_page_override(
    old: &str,
    new: &str,
) -> ThemeResult<String>
{
    let normalized = SlashUtils::add_leading(SlashUtils::strip_trailing(new));

    if !PatternUtils::validate_pattern(&normalized, old)
    {
        return Err(ThemeError::InvalidPageOverride { old: old.to_string(), new: normalized });
    }

    Ok(normalized)
}

/// Apply `overrides` to `author`.
///
/// Keys the author never declared are ignored. The final table is built in
/// author order, so override iteration order only affects `override_log`.
/// Two patterns landing on the same key is an error.
pub fn apply_page_overrides(
    author: &IndexMap<String, Utf8PathBuf>,
    overrides: &IndexMap<String, Value>,
) -> ThemeResult<PageOverrideOutcome>
{
    let mut decisions: IndexMap<&str, PageOverride> = IndexMap::new();
    let mut override_log = IndexMap::new();

    for (old, value) in overrides
    {
        if !author.contains_key(old)
        {
            debug!(pattern = %old, "ignoring override for undeclared page");
            continue;
        }

        let decision = match PageOverride::classify(value)
        {
            PageOverride::Rename(new) =>
            {
                let new = normalize_page_override(old, &new)?;
                override_log.insert(old.clone(), new.clone());
                PageOverride::Rename(new)
            }
            other => other,
        };

        decisions.insert(old.as_str(), decision);
    }

    let mut patterns: IndexMap<String, Utf8PathBuf> = IndexMap::new();
    let mut owners: IndexMap<String, String> = IndexMap::new();
    let mut resolved = IndexMap::new();

    for (pattern, entrypoint) in author
    {
        let target = match decisions.get(pattern.as_str())
        {
            Some(PageOverride::Remove) =>
            {
                debug!(pattern = %pattern, "page removed by user");
                resolved.insert(pattern.clone(), None);
                continue;
            }
            Some(PageOverride::Rename(new)) => new.clone(),
            Some(PageOverride::Keep) | None => pattern.clone(),
        };

        if let Some(first) = owners.get(&target)
        {
            return Err(ThemeError::PatternCollision {
                pattern: target,
                first: first.clone(),
                second: pattern.clone(),
            });
        }

        owners.insert(target.clone(), pattern.clone());
        resolved.insert(pattern.clone(), Some(target.clone()));
        patterns.insert(target, entrypoint.clone());
    }

    Ok(PageOverrideOutcome { patterns, override_log, resolved })
}

/// Derive author patterns from the page files under `pages_dir`.
///
/// The pattern is the file path without extension, a trailing `index`
/// segment dropped. Files or directories starting with `_` are private.
/// A missing directory yields no pages.
pub fn discover_pages(pages_dir: &Utf8Path) -> ThemeResult<IndexMap<String, Utf8PathBuf>>
{
    let glob = format!("**/*.{{{}}}", PAGE_FORMATS.join(","));
    let files = FileWalker::new(&[glob])?.expand(pages_dir);

    let mut pages = IndexMap::new();

    for file in files
    {
        let Ok(relative) = file.strip_prefix(pages_dir)
        else
        {
            continue;
        };

        let Some(pattern) = page_pattern(relative)
        else
        {
            continue;
        };

        if let Some(existing) = pages.get(&pattern)
        {
            warn!(pattern = %pattern, kept = %existing, skipped = %file, "two pages share a route pattern");
            continue;
        }

        pages.insert(pattern, file);
    }

    debug!(dir = %pages_dir, count = pages.len(), "discovered pages");

    Ok(pages)
}

/// `blog/[slug].astro` → `/blog/[slug]`, `index.md` → `/`
fn page_pattern(relative: &Utf8Path) -> Option<String>
{
    let mut segments: Vec<&str> = relative
        .components()
        .map(|c| c.as_str())
        .collect();

    if segments
        .iter()
        .any(|s| s.starts_with('_'))
    {
        return None;
    }

    let file = segments.pop()?;
    if file.ends_with(".d.ts")
    {
        return None;
    }

    let stem = relative.file_stem()?;
    if stem != "index"
    {
        segments.push(stem);
    }

    Some(SlashUtils::add_leading(&segments.join("/")))
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::infra::path::PathUtils;

    fn author() -> IndexMap<String, Utf8PathBuf>
    {
        [("/", "/t/index.astro"), ("/blog", "/t/blog/index.astro"), ("/blog/[slug]", "/t/blog/[slug].astro")]
            .into_iter()
            .map(|(p, e)| (p.to_string(), Utf8PathBuf::from(e)))
            .collect()
    }

    fn overrides(value: Value) -> IndexMap<String, Value>
    {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn classify_values()
    {
        assert_eq!(PageOverride::classify(&json!(false)), PageOverride::Remove);
        assert_eq!(PageOverride::classify(&json!(null)), PageOverride::Remove);
        assert_eq!(PageOverride::classify(&json!("")), PageOverride::Remove);
        assert_eq!(PageOverride::classify(&json!(true)), PageOverride::Keep);
        assert_eq!(PageOverride::classify(&json!("/x")), PageOverride::Rename("/x".into()));
    }

    #[test]
    fn rename_preserving_params()
    {
        let outcome = apply_page_overrides(&author(), &overrides(json!({ "/blog/[slug]": "posts/[slug]/" }))).unwrap();

        assert_eq!(
            outcome
                .patterns
                .keys()
                .collect::<Vec<_>>(),
            vec!["/", "/blog", "/posts/[slug]"]
        );
        assert_eq!(outcome.patterns["/posts/[slug]"], "/t/blog/[slug].astro");
        assert_eq!(outcome.override_log["/blog/[slug]"], "/posts/[slug]");
        assert_eq!(outcome.resolved["/blog/[slug]"].as_deref(), Some("/posts/[slug]"));
    }

    #[test]
    fn rename_changing_params_is_rejected()
    {
        let err = apply_page_overrides(&author(), &overrides(json!({ "/blog": "/blog/[slug]" }))).unwrap_err();

        match err
        {
            ThemeError::InvalidPageOverride { old, new } =>
            {
                assert_eq!(old, "/blog");
                assert_eq!(new, "/blog/[slug]");
            }
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn falsy_removes_route()
    {
        let outcome = apply_page_overrides(&author(), &overrides(json!({ "/blog": false }))).unwrap();

        assert!(
            !outcome
                .patterns
                .contains_key("/blog")
        );
        assert_eq!(outcome.resolved["/blog"], None);
        assert!(
            outcome
                .injected_routes()
                .iter()
                .all(|r| r.entrypoint != "/t/blog/index.astro")
        );
    }

    #[test]
    fn unknown_keys_are_ignored()
    {
        let outcome = apply_page_overrides(&author(), &overrides(json!({ "/nope": false, "/other": "/x" }))).unwrap();

        assert_eq!(outcome.patterns, author());
        assert!(
            outcome
                .override_log
                .is_empty()
        );
    }

    #[test]
    fn override_order_does_not_change_the_table()
    {
        let a = apply_page_overrides(&author(), &overrides(json!({ "/": "/home", "/blog": false }))).unwrap();
        let b = apply_page_overrides(&author(), &overrides(json!({ "/blog": false, "/": "/home" }))).unwrap();

        assert_eq!(a.patterns, b.patterns);
        assert_eq!(a.resolved, b.resolved);
    }

    #[test]
    fn swapping_patterns_is_allowed()
    {
        let author: IndexMap<String, Utf8PathBuf> = [("/a", "/t/a.astro"), ("/b", "/t/b.astro")]
            .into_iter()
            .map(|(p, e)| (p.to_string(), Utf8PathBuf::from(e)))
            .collect();

        let outcome = apply_page_overrides(&author, &overrides(json!({ "/a": "/b", "/b": "/a" }))).unwrap();

        assert_eq!(outcome.patterns["/b"], "/t/a.astro");
        assert_eq!(outcome.patterns["/a"], "/t/b.astro");
    }

    #[test]
    fn landing_on_an_existing_pattern_is_a_collision()
    {
        let err = apply_page_overrides(&author(), &overrides(json!({ "/blog": "/" }))).unwrap_err();

        assert!(matches!(err, ThemeError::PatternCollision { ref pattern, .. } if pattern == "/"));
    }

    #[test]
    fn discovers_pages_from_files()
    {
        let tmp = TempDir::new().unwrap();
        let root = PathUtils::to_utf8(
            tmp.path()
                .to_path_buf(),
        )
        .unwrap();

        for rel in ["index.astro", "blog/index.md", "blog/[slug].astro", "_partials/Card.astro", "_draft.astro", "api/feed.xml.ts", "notes.txt"]
        {
            let path = root.join(rel);
            fs::create_dir_all(
                path.parent()
                    .unwrap(),
            )
            .unwrap();
            fs::write(path, "").unwrap();
        }

        let pages = discover_pages(&root).unwrap();

        let mut patterns: Vec<_> = pages
            .keys()
            .cloned()
            .collect();
        patterns.sort();
        assert_eq!(patterns, vec!["/", "/api/feed.xml", "/blog", "/blog/[slug]"]);
        assert_eq!(pages["/blog"], root.join("blog/index.md"));
    }

    #[test]
    fn missing_pages_dir_is_empty()
    {
        assert!(
            discover_pages(Utf8Path::new("/no/such/pages"))
                .unwrap()
                .is_empty()
        );
    }
}
