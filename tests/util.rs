//! Shared test utilities for integration tests
//!
//! Builds a small theme and a project that consumes it.

#![allow(dead_code)]

use assert_fs::prelude::*;
use camino::Utf8PathBuf;

/// Theme manifest used by most tests
pub const MANIFEST: &str = r#"
name = "my-theme"
entrypoint = "index.ts"
integrations = ["@astrojs/mdx", "@astrojs/sitemap"]

[imports]
assets = "assets/**.{png,svg}"
config = "components/**.astro"

[schema]
strict = true

[schema.fields.title]
type = "string"
required = true

[schema.fields.posts_per_page]
type = "number"
default = 10
"#;

const PACKAGE_JSON: &str = r#"{
  "name": "my-theme",
  "keywords": ["astro-integration"],
  "description": "A test theme",
  "homepage": "https://example.com",
  "repository": "https://example.com/repo.git"
}"#;

/// A theme plus a consuming project, side by side in one temp dir
pub struct Fixture
{
    pub tmp: assert_fs::TempDir,
}

impl Fixture
{
    pub fn theme(&self) -> Utf8PathBuf
    {
        self.root()
            .join("theme")
    }

    pub fn project(&self) -> Utf8PathBuf
    {
        self.root()
            .join("project")
    }

    /// Canonical root, so expectations match resolved paths
    pub fn root(&self) -> Utf8PathBuf
    {
        let canonical = dunce::canonicalize(self.tmp.path()).expect("canonical tempdir");
        Utf8PathBuf::from_path_buf(canonical).expect("utf8 tempdir")
    }

    pub fn write(
        &self,
        path: &str,
        content: &str,
    )
    {
        self.tmp
            .child(path)
            .write_str(content)
            .expect("write fixture file");
    }

    /// Write `theme-provider.toml` for the project
    pub fn project_config(
        &self,
        body: &str,
    )
    {
        self.write("project/theme-provider.toml", &format!("theme = \"../theme\"\n{body}"));
    }
}

/// Build the standard theme and an empty project
pub fn make_fixture() -> Fixture
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    let fixture = Fixture { tmp };

    fixture.write("theme/theme.toml", MANIFEST);
    fixture.write("theme/index.ts", "export default function theme(options) {}\n");
    fixture.write("theme/package.json", PACKAGE_JSON);
    fixture.write("theme/README.md", "# my-theme\n");

    fixture.write("theme/src/assets/avatar.png", "png");
    fixture.write("theme/src/assets/logo.svg", "<svg/>");
    fixture.write("theme/src/components/Card.astro", "---\n---\n<div />\n");
    fixture.write("theme/src/components/hero-banner.astro", "---\n---\n<header />\n");
    fixture.write("theme/src/layouts/Base.astro", "<slot />\n");
    fixture.write("theme/src/styles/global.css", "body {}\n");

    fixture.write("theme/src/pages/index.astro", "home\n");
    fixture.write("theme/src/pages/blog/index.astro", "blog\n");
    fixture.write("theme/src/pages/blog/[slug].astro", "post\n");
    fixture.write("theme/src/pages/_draft.astro", "draft\n");

    fixture.write("theme/public/favicon.svg", "<svg/>");

    fixture.write("project/custom-avatar.png", "png");
    fixture.write("project/src/MyCard.astro", "<article />\n");

    fixture
}
