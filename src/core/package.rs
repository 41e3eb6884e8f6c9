//! Theme package metadata: name validation and advisory `package.json`
//! checks.

use std::{fmt, fs, io, sync::LazyLock};

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{ThemeError, ThemeResult};

/// Keyword the host uses to list integrations
pub const INTEGRATION_KEYWORD: &str = "astro-integration";

const MAX_NAME_LENGTH: usize = 214;

static PACKAGE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:@[a-z0-9-*~][a-z0-9-*._~]*/)?[a-z0-9-~][a-z0-9-._~]*$").expect("package name regex")
});

/// Names that cannot be published
const BLOCKED_NAMES: &[&str] = &["node_modules", "favicon.ico"];

/// Check `name` against npm package naming rules.
pub fn validate_theme_name(name: &str) -> ThemeResult<()>
{
    let reason = if name.is_empty()
    {
        Some("name must not be empty")
    }
    else if name.len() > MAX_NAME_LENGTH
    {
        Some("name must not be longer than 214 characters")
    }
    else if name.trim() != name
    {
        Some("name must not contain leading or trailing spaces")
    }
    else if name.starts_with('.') || name.starts_with('_')
    {
        Some("name must not start with a period or an underscore")
    }
    else if name.to_lowercase() != name
    {
        Some("name must not contain capital letters")
    }
    else if BLOCKED_NAMES.contains(&name)
    {
        Some("name is blocked from publication")
    }
    else if !PACKAGE_NAME.is_match(name)
    {
        Some("name can only contain URL-friendly characters")
    }
    else
    {
        None
    };

    match reason
    {
        Some(reason) => Err(ThemeError::InvalidThemeName { name: name.to_string(), reason: reason.to_string() }),
        None => Ok(()),
    }
}

/// The fields of `package.json` the checks look at
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageJson
{
    pub name: Option<String>,

    #[serde(default)]
    pub private: bool,

    #[serde(default)]
    pub keywords: Vec<String>,

    pub description: Option<String>,
    pub homepage: Option<String>,
    pub repository: Option<Value>,
}

/// A theme's `package.json` and where it was read from
#[derive(Debug, Clone)]
pub struct ThemePackage
{
    pub path: Utf8PathBuf,
    pub json: PackageJson,
}

/// Advisory findings about a theme package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageWarning
{
    MissingKeyword,
    MissingDescription,
    MissingHomepage,
    MissingRepository,
    MissingReadme,
}

impl fmt::Display for PackageWarning
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result
    {
        let message = match self
        {
            Self::MissingKeyword => "add the \"astro-integration\" keyword to the theme's package.json",
            Self::MissingDescription => "add a \"description\" to the theme's package.json",
            Self::MissingHomepage => "add a \"homepage\" to the theme's package.json",
            Self::MissingRepository => "add a \"repository\" to the theme's package.json",
            Self::MissingReadme => "add a README.md to the root of the theme's package",
        };
        f.write_str(message)
    }
}

impl ThemePackage
{
    /// Read `package.json` from `root`. A missing file is `Ok(None)`.
    pub fn read(root: &Utf8Path) -> ThemeResult<Option<Self>>
    {
        let path = root.join("package.json");

        let text = match fs::read_to_string(&path)
        {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(ThemeError::Io { path, source }),
        };

        let json = serde_json::from_str(&text)
            .map_err(|err| ThemeError::Manifest { path: path.clone(), message: err.to_string() })?;

        Ok(Some(Self { path, json }))
    }

    /// Directory holding the package
    pub fn root(&self) -> &Utf8Path
    {
        self.path
            .parent()
            .unwrap_or(&self.path)
    }

    /// Publishing hints; private packages get none.
    pub fn warnings(&self) -> Vec<PackageWarning>
    {
        let json = &self.json;
        let mut out = Vec::new();

        if json.private
        {
            return out;
        }

        if !json
            .keywords
            .iter()
            .any(|k| k == INTEGRATION_KEYWORD)
        {
            out.push(PackageWarning::MissingKeyword);
        }
        if is_blank(&json.description)
        {
            out.push(PackageWarning::MissingDescription);
        }
        if is_blank(&json.homepage)
        {
            out.push(PackageWarning::MissingHomepage);
        }
        if json
            .repository
            .as_ref()
            .is_none_or(|r| r.is_null() || r.as_str() == Some(""))
        {
            out.push(PackageWarning::MissingRepository);
        }
        if !self
            .root()
            .join("README.md")
            .exists()
        {
            out.push(PackageWarning::MissingReadme);
        }

        out
    }

    /// Log each warning; returns how many were emitted
    pub fn log_warnings(&self) -> usize
    {
        let warnings = self.warnings();
        let name = self
            .json
            .name
            .as_deref()
            .unwrap_or("theme");

        for warning in &warnings
        {
            warn!(package = %name, "{warning}");
        }

        warnings.len()
    }
}

fn is_blank(value: &Option<String>) -> bool
{
    value
        .as_deref()
        .is_none_or(|v| {
            v.trim()
                .is_empty()
        })
}
