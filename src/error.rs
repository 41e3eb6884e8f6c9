//! Error taxonomy for a configuration pass.
//!
//! Every variant is a configuration error: the pass aborts and the author or
//! user fixes the input. Soft warnings never become errors; they are logged
//! through `tracing` instead.

use std::path::PathBuf;

use camino::Utf8PathBuf;
use miette::Diagnostic;

/// Fatal configuration errors raised while building a theme.
#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum ThemeError
{
    #[error("invalid theme name \"{name}\": {reason}")]
    #[diagnostic(
        code(theme::name),
        help("theme names follow npm package naming rules, e.g. \"my-theme\" or \"@scope/my-theme\"")
    )]
    InvalidThemeName
    {
        name: String,
        reason: String,
    },

    #[error("invalid configuration passed to \"{theme}\" integration\n{}", .issues.join("\n"))]
    #[diagnostic(code(theme::config))]
    InvalidConfig
    {
        theme: String,
        issues: Vec<String>,
    },

    #[error(
        "invalid page override, pattern must contain the same params in the same location\nNew: {new}\nOld: {old}"
    )]
    #[diagnostic(
        code(theme::pages),
        help("only segments without brackets may change; keep every [param] segment where it is")
    )]
    InvalidPageOverride
    {
        old: String,
        new: String,
    },

    #[error("page patterns \"{first}\" and \"{second}\" both resolve to \"{pattern}\"")]
    #[diagnostic(code(theme::pages::collision))]
    PatternCollision
    {
        pattern: String,
        first: String,
        second: String,
    },

    #[error("cannot create virtual import \"{id}\", the prefix \"{prefix}\" is reserved for the host pipeline")]
    #[diagnostic(code(theme::virtual_id))]
    ReservedVirtualId
    {
        id: String,
        prefix: String,
    },

    #[error("invalid glob \"{glob}\"")]
    #[diagnostic(code(theme::glob))]
    InvalidGlob
    {
        glob: String,
        #[source]
        source: globset::Error,
    },

    #[error("{what} does not exist: {path}")]
    #[diagnostic(code(theme::path))]
    MissingPath
    {
        what: &'static str,
        path: Utf8PathBuf,
    },

    #[error("expected a filepath but received a directory: {path}")]
    #[diagnostic(code(theme::path))]
    ExpectedFile
    {
        path: Utf8PathBuf,
    },

    #[error("path is not valid UTF-8: {}", .0.display())]
    #[diagnostic(code(theme::path))]
    NonUtf8Path(PathBuf),

    #[error("could not read {path}")]
    #[diagnostic(code(theme::io))]
    Io
    {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {path}: {message}")]
    #[diagnostic(code(theme::manifest))]
    Manifest
    {
        path: Utf8PathBuf,
        message: String,
    },
}

/// Result alias used throughout the engine.
pub type ThemeResult<T> = Result<T, ThemeError>;
