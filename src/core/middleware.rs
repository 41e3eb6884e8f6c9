//! Middleware discovery under the theme's middleware directory.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::debug;

use crate::{error::ThemeResult, infra::walk::FileWalker};

/// Files considered middleware, relative to the middleware directory
pub const MIDDLEWARE_GLOBS: &[&str] = &["middleware.{ts,js}", "middleware/*.{ts,js}"];

/// Position in the host's middleware chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MiddlewareOrder
{
    Pre,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MiddlewareEntry
{
    pub entrypoint: Utf8PathBuf,
    pub order: MiddlewareOrder,
}

impl MiddlewareOrder
{
    /// `middleware`, `index` and `pre` run before the project's own
    /// middleware, `post` after; other stems are not middleware.
    pub fn from_stem(stem: &str) -> Option<Self>
    {
        match stem
        {
            "middleware" | "index" | "pre" => Some(Self::Pre),
            "post" => Some(Self::Post),
            _ => None,
        }
    }
}

/// Find middleware entrypoints under `dir`, in sorted path order.
pub fn discover_middleware(dir: &Utf8Path) -> ThemeResult<Vec<MiddlewareEntry>>
{
    let globs: Vec<String> = MIDDLEWARE_GLOBS
        .iter()
        .map(|g| g.to_string())
        .collect();

    let entries: Vec<MiddlewareEntry> = FileWalker::new(&globs)?
        .expand(dir)
        .into_iter()
        .filter_map(|entrypoint| {
            let order = entrypoint
                .file_stem()
                .and_then(MiddlewareOrder::from_stem)?;
            Some(MiddlewareEntry { entrypoint, order })
        })
        .collect();

    debug!(dir = %dir, count = entries.len(), "discovered middleware");

    Ok(entries)
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::infra::path::PathUtils;

    #[test]
    fn finds_pre_and_post_middleware()
    {
        let tmp = TempDir::new().unwrap();
        let root = PathUtils::to_utf8(
            tmp.path()
                .to_path_buf(),
        )
        .unwrap();

        fs::create_dir_all(root.join("middleware")).unwrap();
        for rel in ["middleware.ts", "middleware/post.js", "middleware/helpers.ts", "middleware/pre.ts", "other.ts"]
        {
            fs::write(root.join(rel), "").unwrap();
        }

        let found = discover_middleware(&root).unwrap();
        let summary: Vec<_> = found
            .iter()
            .map(|m| {
                (
                    m.entrypoint
                        .strip_prefix(&root)
                        .unwrap()
                        .to_string(),
                    m.order,
                )
            })
            .collect();

        assert_eq!(
            summary,
            vec![
                ("middleware.ts".to_string(), MiddlewareOrder::Pre),
                ("middleware/post.js".to_string(), MiddlewareOrder::Post),
                ("middleware/pre.ts".to_string(), MiddlewareOrder::Pre),
            ]
        );
    }

    #[test]
    fn missing_directory_has_no_middleware()
    {
        assert!(
            discover_middleware(Utf8Path::new("/no/such/dir"))
                .unwrap()
                .is_empty()
        );
    }
}
