//! Filepath: src/infra/path.rs
//! Path, slash, extension, pattern and naming helpers.
//! All functions are associated fns grouped by concern so call sites
//! read as `SlashUtils::add_leading(..)` or `NameUtils::camel_case(..)`.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

use crate::error::{ThemeError, ThemeResult};

/// Image extensions typed as image metadata in generated declarations
pub const IMAGE_FORMATS: &[&str] = &["jpeg", "jpg", "png", "tiff", "webp", "gif", "svg", "avif"];

/// Stylesheet extensions imported for side effects only
pub const STYLE_FORMATS: &[&str] = &["css", "scss", "sass", "styl", "less"];

/// Component extensions picked up by the default `components` glob
pub const UI_FRAMEWORK_FORMATS: &[&str] = &["tsx", "jsx", "svelte", "vue", "lit"];

/// Page entry extensions recognised under the pages directory
pub const PAGE_FORMATS: &[&str] = &["astro", "ts", "js", "md", "mdx", "html"];

/// Leading and trailing slash helpers for route patterns and ids
pub struct SlashUtils;

impl SlashUtils
{
    /// Remove every leading `/`
    pub fn strip_leading(path: &str) -> &str
    {
        path.trim_start_matches('/')
    }

    /// Remove every trailing `/`
    pub fn strip_trailing(path: &str) -> &str
    {
        path.trim_end_matches('/')
    }

    /// Remove slashes on both ends
    pub fn strip_both(path: &str) -> &str
    {
        Self::strip_trailing(Self::strip_leading(path))
    }

    /// Ensure exactly one leading `/`
    pub fn add_leading(path: &str) -> String
    {
        format!("/{}", Self::strip_leading(path))
    }

    /// Ensure exactly one trailing `/`
    pub fn add_trailing(path: &str) -> String
    {
        format!("{}/", Self::strip_trailing(path))
    }

    /// Ensure exactly one slash on both ends; the empty path becomes `/`
    pub fn add_both(path: &str) -> String
    {
        let inner = Self::strip_both(path);

        if inner.is_empty() { "/".to_string() } else { format!("/{inner}/") }
    }

    /// Collapse every run of `/` and `\` into a single `/`
    pub fn normalize(path: &str) -> String
    {
        let mut out = String::with_capacity(path.len());
        let mut in_run = false;

        for c in path.chars()
        {
            if c == '/' || c == '\\'
            {
                if !in_run
                {
                    out.push('/');
                }

                in_run = true;
                continue;
            }

            in_run = false;
            out.push(c);
        }

        out
    }
}

/// Absolute/relative resolution without touching the filesystem
pub struct PathUtils;

impl PathUtils
{
    /// True for absolute filesystem paths. Bare package specifiers
    /// (`"package"`, `"@scope/pkg/file"`) are not absolute.
    pub fn is_absolute_id(id: &str) -> bool
    {
        Utf8Path::new(id).is_absolute()
    }

    /// Join `path` onto `base` folding `.` and `..` lexically.
    /// An absolute `path` replaces `base`.
    pub fn lexical_join(
        base: &Utf8Path,
        path: &str,
    ) -> Utf8PathBuf
    {
        let mut out = Utf8PathBuf::new();

        for component in base
            .components()
            .chain(Utf8Path::new(path).components())
        {
            match component
            {
                Utf8Component::Prefix(_) | Utf8Component::RootDir =>
                {
                    out.push(component.as_str());
                }
                Utf8Component::CurDir =>
                {}
                Utf8Component::ParentDir =>
                {
                    out.pop();
                }
                Utf8Component::Normal(segment) =>
                {
                    out.push(segment);
                }
            }
        }

        out
    }

    /// Resolve a module id against `root`. Ids starting with `.` are
    /// relative to `root`; everything else (absolute paths, package
    /// specifiers) passes through. Slashes are normalized either way.
    pub fn resolve_id(
        root: &Utf8Path,
        id: &str,
    ) -> String
    {
        if id.starts_with('.')
        {
            return SlashUtils::normalize(
                Self::lexical_join(root, id).as_str(),
            );
        }

        SlashUtils::normalize(id)
    }

    /// Convert an owned std path into a UTF-8 path
    pub fn to_utf8(path: std::path::PathBuf) -> ThemeResult<Utf8PathBuf>
    {
        Utf8PathBuf::from_path_buf(path).map_err(ThemeError::NonUtf8Path)
    }

    /// Resolve a directory from `base` (a directory, or a file whose parent
    /// is used). Paths with an extension resolve to their parent directory.
    pub fn resolve_directory(
        base: &Utf8Path,
        path: &str,
        must_exist: bool,
    ) -> ThemeResult<Utf8PathBuf>
    {
        let mut resolved = Self::resolve_against(base, path)?;

        if resolved
            .extension()
            .is_some()
        {
            resolved.pop();
        }

        if must_exist && !resolved.exists()
        {
            return Err(ThemeError::MissingPath { what: "directory", path: resolved });
        }

        Ok(resolved)
    }

    /// Resolve a file from `base`. An extensionless result is rejected
    /// because it names a directory.
    pub fn resolve_filepath(
        base: &Utf8Path,
        path: &str,
        must_exist: bool,
    ) -> ThemeResult<Utf8PathBuf>
    {
        let resolved = Self::resolve_against(base, path)?;

        if resolved
            .extension()
            .is_none()
        {
            return Err(ThemeError::ExpectedFile { path: resolved });
        }

        if must_exist && !resolved.exists()
        {
            return Err(ThemeError::MissingPath { what: "file", path: resolved });
        }

        Ok(resolved)
    }

    /// Shared resolution: file URLs decoded, relative paths joined onto the
    /// base directory, relative bases anchored at the working directory.
    fn resolve_against(
        base: &Utf8Path,
        path: &str,
    ) -> ThemeResult<Utf8PathBuf>
    {
        let path = Self::from_file_url(path)?;
        let base_dir = Self::base_directory(base)?;

        Ok(Self::lexical_join(&base_dir, &path))
    }

    /// The directory a base path stands for, made absolute
    fn base_directory(base: &Utf8Path) -> ThemeResult<Utf8PathBuf>
    {
        let mut dir = if base.is_absolute()
        {
            base.to_path_buf()
        }
        else
        {
            let cwd = std::env::current_dir().map_err(|source| ThemeError::Io {
                path: Utf8PathBuf::from("."),
                source,
            })?;

            Self::lexical_join(&Self::to_utf8(cwd)?, base.as_str())
        };

        if dir
            .extension()
            .is_some()
        {
            dir.pop();
        }

        Ok(dir)
    }

    /// Decode `file://` URLs into paths; other inputs pass through
    fn from_file_url(path: &str) -> ThemeResult<String>
    {
        if !path.starts_with("file:/")
        {
            return Ok(path.to_string());
        }

        let file_path = url::Url::parse(path)
            .ok()
            .and_then(|u| {
                u.to_file_path()
                    .ok()
            })
            .ok_or_else(|| ThemeError::MissingPath {
                what: "file URL target",
                path: Utf8PathBuf::from(path),
            })?;

        Ok(Self::to_utf8(file_path)?.into_string())
    }
}

/// Extension classification
pub struct ExtUtils;

impl ExtUtils
{
    /// Lower-cased extension without the dot
    pub fn extension(path: &str) -> Option<String>
    {
        Utf8Path::new(path)
            .extension()
            .map(str::to_ascii_lowercase)
    }

    /// Recognised image format
    pub fn is_image(path: &str) -> bool
    {
        Self::extension(path).is_some_and(|ext| IMAGE_FORMATS.contains(&ext.as_str()))
    }

    /// Recognised stylesheet format (side-effect import)
    pub fn is_style(path: &str) -> bool
    {
        Self::extension(path).is_some_and(|ext| STYLE_FORMATS.contains(&ext.as_str()))
    }

    /// File name without its final extension
    pub fn stem(path: &Utf8Path) -> Option<&str>
    {
        path.file_stem()
    }
}

/// Route pattern shape helpers
pub struct PatternUtils;

impl PatternUtils
{
    /// Reduce a pattern to its parameter shape: every segment without a
    /// `[` becomes `/`, parameter segments are kept verbatim.
    /// `/blog/[slug]` and `/docs/[slug]` both reduce to `/[slug]`.
    pub fn normalize_pattern(pattern: &str) -> String
    {
        SlashUtils::strip_both(pattern)
            .split('/')
            .map(|slug| if slug.contains('[') { slug } else { "/" })
            .collect()
    }

    /// A replacement pattern is valid when it has the same parameter
    /// segments in the same positions as the original
    pub fn validate_pattern(
        new_pattern: &str,
        old_pattern: &str,
    ) -> bool
    {
        Self::normalize_pattern(new_pattern) == Self::normalize_pattern(old_pattern)
    }
}

/// Export-name helpers
pub struct NameUtils;

impl NameUtils
{
    /// Fold a kebab/path-like name into camelCase. A boundary character
    /// followed by any character except a line break is replaced by that
    /// character upper-cased; matches do not overlap.
    ///
    /// This is the only case fold in the crate. Content generation, type
    /// generation and override lookup all go through it.
    pub fn camel_case(name: &str) -> String
    {
        let mut out = String::with_capacity(name.len());
        let mut chars = name
            .chars()
            .peekable();

        while let Some(c) = chars.next()
        {
            if Self::is_boundary(c)
                && let Some(&next) = chars.peek()
                && next != '\n'
                && next != '\r'
            {
                chars.next();
                out.extend(next.to_uppercase());
                continue;
            }

            out.push(c);
        }

        out
    }

    fn is_boundary(c: char) -> bool
    {
        matches!(c, '-' | '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || c.is_whitespace()
    }
}
