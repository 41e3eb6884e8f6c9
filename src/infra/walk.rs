//! Filepath: src/infra/walk.rs
//! Glob expansion against a directory.
//! - Include patterns plus `!`-prefixed exclude patterns
//! - `node_modules` is always pruned, dotfiles are skipped by default
//! - `*` never crosses a `/`; `**` recurses only as a whole segment
//! - Deterministic (sorted) output so "last match wins" rules are stable
//!
//! Backed by ripgrep's `ignore` crate for traversal and `globset` for
//! matching. Ignore files (.gitignore and friends) are not consulted: a theme
//! declares exactly which files it exports.

use camino::{Utf8Path, Utf8PathBuf};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};
use tracing::trace;

use crate::{
    error::{ThemeError, ThemeResult},
    infra::path::SlashUtils,
};

/// Patterns excluded from every expansion
pub const GLOB_IGNORE: &[&str] = &["**/node_modules/**"];

/// Directory names pruned before descending
const PRUNED_DIRS: &[&str] = &["node_modules"];

/// Glob walker with include and exclude sets.
pub struct FileWalker
{
    /// Files must match one of these (relative to the walk root)
    include: GlobSet,

    /// Files matching any of these are dropped
    exclude: GlobSet,

    /// Include hidden (dot) files; default false, like most JS glob libraries
    include_hidden: bool,
}

impl FileWalker
{
    /// Build a walker from glob patterns (e.g. `"assets/**.{png,svg}"`,
    /// `"!**/*.test.ts"`). Patterns match on paths relative to the root.
    pub fn new(patterns: &[String]) -> ThemeResult<Self>
    {
        let mut include = GlobSetBuilder::new();
        let mut exclude = GlobSetBuilder::new();

        for pattern in patterns
        {
            match pattern.strip_prefix('!')
            {
                Some(negated) => exclude.add(Self::compile(negated, pattern)?),
                None => include.add(Self::compile(pattern, pattern)?),
            };
        }

        for pattern in GLOB_IGNORE
        {
            exclude.add(Self::compile(pattern, pattern)?);
        }

        Ok(Self {
            include: Self::finish(include, patterns)?,
            exclude: Self::finish(exclude, patterns)?,
            include_hidden: false,
        })
    }

    /// (Optional) Include or exclude hidden files (dotfiles).
    pub fn with_include_hidden(
        mut self,
        include_hidden: bool,
    ) -> Self
    {
        self.include_hidden = include_hidden;
        self
    }

    /// Rewrite `**` that is not a whole path segment into `*`.
    /// `assets/**.png` matches files directly under `assets/`, while
    /// `assets/**/*.png` recurses.
    pub fn normalize_recursive(pattern: &str) -> String
    {
        pattern
            .split('/')
            .map(|segment| {
                if segment == "**" || !segment.contains("**")
                {
                    return segment.to_string();
                }

                let mut out = String::with_capacity(segment.len());
                for c in segment.chars()
                {
                    if c == '*' && out.ends_with('*')
                    {
                        continue;
                    }
                    out.push(c);
                }
                out
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Internal: compile one pattern, reporting errors against `original`.
    fn compile(
        pattern: &str,
        original: &str,
    ) -> ThemeResult<globset::Glob>
    {
        let relative = pattern
            .strip_prefix("./")
            .unwrap_or(pattern);
        let normalized = Self::normalize_recursive(SlashUtils::strip_leading(relative));

        GlobBuilder::new(&normalized)
            .literal_separator(true)
            .build()
            .map_err(|source| ThemeError::InvalidGlob { glob: original.to_string(), source })
    }

    /// Internal: build a set, reporting errors against the whole list.
    fn finish(
        builder: GlobSetBuilder,
        patterns: &[String],
    ) -> ThemeResult<GlobSet>
    {
        builder
            .build()
            .map_err(|source| ThemeError::InvalidGlob { glob: patterns.join(", "), source })
    }

    /// Internal: construct a configured WalkBuilder for `root`.
    fn build_walk(
        &self,
        root: &Utf8Path,
    ) -> WalkBuilder
    {
        let mut b = WalkBuilder::new(root);

        // No ignore files; hidden policy is ours
        b.standard_filters(false);
        b.hidden(!self.include_hidden);
        b.follow_links(false);

        // Early directory pruning (fast short-circuit).
        b.filter_entry(|ent: &DirEntry| {
            let is_dir = ent
                .file_type()
                .is_some_and(|ft| ft.is_dir());

            !(is_dir
                && ent
                    .file_name()
                    .to_str()
                    .is_some_and(|name| PRUNED_DIRS.contains(&name)))
        });

        b
    }

    /// Expand the patterns under `root`. Returns absolute paths in
    /// **sorted** order; a missing root yields no files.
    pub fn expand<P: AsRef<Utf8Path>>(
        &self,
        root: P,
    ) -> Vec<Utf8PathBuf>
    {
        let root = root.as_ref();

        let mut out: Vec<Utf8PathBuf> = self
            .build_walk(root)
            .build()
            // Unreadable entries are skipped
            .filter_map(|res| res.ok())
            .filter(|entry| {
                entry
                    .file_type()
                    .is_some_and(|ft| ft.is_file())
            })
            .filter_map(|entry| {
                let path = entry.into_path();
                match Utf8PathBuf::from_path_buf(path)
                {
                    Ok(p) => Some(p),
                    Err(p) =>
                    {
                        trace!(path = %p.display(), "skipping non UTF-8 path");
                        None
                    }
                }
            })
            .filter(|abs| {
                let rel = abs
                    .strip_prefix(root)
                    .unwrap_or(abs);
                self.include
                    .is_match(rel)
                    && !self
                        .exclude
                        .is_match(rel)
            })
            .collect();

        out.sort();

        out
    }
}
