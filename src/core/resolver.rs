//! Virtual module resolver: serves a namespace of synthetic ids to the host
//! build pipeline.
//!
//! Ids are wrapped with a NUL sentinel so the pipeline never treats them as
//! files. Dynamic entries carry the importer in a query string so `load`
//! can answer differently depending on who is asking.

use std::fmt;

use indexmap::IndexMap;
use tracing::{debug, trace};
use url::form_urlencoded;

use crate::error::{ThemeError, ThemeResult};

/// Marks an id as virtual to the host module graph
pub const VIRTUAL_PREFIX: &str = "\0";

/// Owned by the host pipeline; never registered by a theme
pub const RESERVED_PREFIX: &str = "astro:";

/// Query key carrying the importing module
const IMPORTER_PARAM: &str = "importer";

/// Request details passed to dynamic content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadParams
{
    pub ssr: bool,
    pub importer: Option<String>,
}

/// Content producer for importer-aware modules
pub type DynamicLoader = Box<dyn Fn(&LoadParams) -> Option<String> + Send + Sync>;

/// What a virtual id serves
pub enum VirtualContent
{
    Static(String),
    Dynamic(DynamicLoader),
}

impl fmt::Debug for VirtualContent
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result
    {
        match self
        {
            Self::Static(content) => f
                .debug_tuple("Static")
                .field(content)
                .finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<String> for VirtualContent
{
    fn from(content: String) -> Self
    {
        Self::Static(content)
    }
}

impl From<&str> for VirtualContent
{
    fn from(content: &str) -> Self
    {
        Self::Static(content.to_string())
    }
}

/// The seam with the host build pipeline's plugin chain
pub trait PipelinePlugin
{
    /// Plugin name shown by the host
    fn name(&self) -> &str;

    /// Map an import specifier to an internal id, or decline with `None`
    fn resolve_id(
        &self,
        id: &str,
        importer: Option<&str>,
    ) -> Option<String>;

    /// Produce source for an id returned by [`PipelinePlugin::resolve_id`]
    fn load(
        &self,
        id: &str,
        ssr: bool,
    ) -> Option<String>;
}

/// Registry of virtual ids for one theme.
#[derive(Debug)]
pub struct VirtualResolver
{
    name: String,

    /// Keyed by sentinel-wrapped id, in registration order
    entries: IndexMap<String, VirtualContent>,
}

impl VirtualResolver
{
    /// Build a resolver. Fails before registering anything if any id uses
    /// the host's reserved prefix.
    pub fn new(
        name: &str,
        imports: IndexMap<String, VirtualContent>,
    ) -> ThemeResult<Self>
    {
        if let Some(id) = imports
            .keys()
            .find(|id| id.starts_with(RESERVED_PREFIX))
        {
            return Err(ThemeError::ReservedVirtualId {
                id: id.clone(),
                prefix: RESERVED_PREFIX.to_string(),
            });
        }

        let entries = imports
            .into_iter()
            .map(|(id, content)| (Self::sentinel(&id), content))
            .collect();

        Ok(Self { name: format!("{name}-virtual-resolver"), entries })
    }

    fn sentinel(id: &str) -> String
    {
        format!("{VIRTUAL_PREFIX}{id}")
    }

    /// Registered ids without the sentinel
    pub fn ids(&self) -> impl Iterator<Item = &str>
    {
        self.entries
            .keys()
            .filter_map(|id| id.strip_prefix(VIRTUAL_PREFIX))
    }

    pub fn len(&self) -> usize
    {
        self.entries
            .len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.entries
            .is_empty()
    }

    /// True when `id` (without sentinel) is registered
    pub fn contains(
        &self,
        id: &str,
    ) -> bool
    {
        self.entries
            .contains_key(&Self::sentinel(id))
    }

    /// Whether `id` serves importer-dependent content
    pub fn is_dynamic(
        &self,
        id: &str,
    ) -> bool
    {
        matches!(self.entries.get(&Self::sentinel(id)), Some(VirtualContent::Dynamic(_)))
    }

    /// Resolve and load in one step, the way the pipeline would
    pub fn serve(
        &self,
        id: &str,
        importer: Option<&str>,
        ssr: bool,
    ) -> Option<String>
    {
        let resolved = self.resolve_id(id, importer)?;
        self.load(&resolved, ssr)
    }
}

impl PipelinePlugin for VirtualResolver
{
    fn name(&self) -> &str
    {
        &self.name
    }

    fn resolve_id(
        &self,
        id: &str,
        importer: Option<&str>,
    ) -> Option<String>
    {
        let resolved = Self::sentinel(id);

        match self
            .entries
            .get(&resolved)?
        {
            VirtualContent::Static(_) => Some(resolved),
            VirtualContent::Dynamic(_) =>
            {
                let mut query = form_urlencoded::Serializer::new(String::new());
                if let Some(importer) = importer
                {
                    query.append_pair(IMPORTER_PARAM, importer);
                }

                Some(format!("{resolved}?{}&x", query.finish()))
            }
        }
    }

    fn load(
        &self,
        id: &str,
        ssr: bool,
    ) -> Option<String>
    {
        if !id.starts_with(VIRTUAL_PREFIX)
        {
            return None;
        }

        let (resolved, raw_query) = id
            .split_once('?')
            .unwrap_or((id, ""));

        match self
            .entries
            .get(resolved)?
        {
            VirtualContent::Static(content) => Some(content.clone()),
            VirtualContent::Dynamic(loader) =>
            {
                let importer = form_urlencoded::parse(raw_query.as_bytes())
                    .find(|(key, _)| key == IMPORTER_PARAM)
                    .map(|(_, value)| value.into_owned())
                    .filter(|value| !value.is_empty());

                trace!(id = %resolved.trim_start_matches(VIRTUAL_PREFIX), ?importer, "loading dynamic module");

                let content = loader(&LoadParams { ssr, importer }).filter(|content| !content.is_empty());

                if content.is_none()
                {
                    debug!(id = %resolved.trim_start_matches(VIRTUAL_PREFIX), "dynamic module declined");
                }

                content
            }
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn resolver() -> VirtualResolver
    {
        let mut imports: IndexMap<String, VirtualContent> = IndexMap::new();
        imports.insert("my-theme/config".into(), "export default {}".into());
        imports.insert(
            "my-theme/components".into(),
            VirtualContent::Dynamic(Box::new(|params: &LoadParams| {
                match params
                    .importer
                    .as_deref()
                {
                    Some("/theme/Card.astro") => Some("original".to_string()),
                    Some("/empty.astro") => Some(String::new()),
                    _ => Some(format!("merged ssr={}", params.ssr)),
                }
            })),
        );

        VirtualResolver::new("my-theme", imports).unwrap()
    }

    #[test]
    fn static_ids_resolve_to_sentinel()
    {
        let r = resolver();
        assert_eq!(r.resolve_id("my-theme/config", Some("/x.astro")), Some("\0my-theme/config".to_string()));
        assert_eq!(r.load("\0my-theme/config", false), Some("export default {}".to_string()));
    }

    #[test]
    fn unknown_ids_decline()
    {
        let r = resolver();
        assert_eq!(r.resolve_id("my-theme/nope", None), None);
        assert_eq!(r.load("\0my-theme/nope", false), None);
        assert_eq!(r.load("my-theme/config", false), None);
    }

    #[test]
    fn dynamic_ids_carry_the_importer()
    {
        let r = resolver();

        let id = r
            .resolve_id("my-theme/components", Some("/theme/Card.astro"))
            .unwrap();
        assert_eq!(id, "\0my-theme/components?importer=%2Ftheme%2FCard.astro&x");
        assert_eq!(r.load(&id, false), Some("original".to_string()));

        let id = r
            .resolve_id("my-theme/components", None)
            .unwrap();
        assert_eq!(id, "\0my-theme/components?&x");
        assert_eq!(r.load(&id, true), Some("merged ssr=true".to_string()));
    }

    #[test]
    fn importer_with_reserved_url_characters_round_trips()
    {
        let r = resolver();
        let importer = "/a b/c&d=e?f#g+h.astro";

        let id = r
            .resolve_id("my-theme/components", Some(importer))
            .unwrap();
        let (_, query) = id
            .split_once('?')
            .unwrap();
        let decoded: Vec<_> = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();

        assert_eq!(decoded[0], ("importer".to_string(), importer.to_string()));
    }

    #[test]
    fn empty_dynamic_result_declines()
    {
        let r = resolver();
        assert_eq!(r.serve("my-theme/components", Some("/empty.astro"), false), None);
    }

    #[test]
    fn reserved_prefix_is_rejected()
    {
        let mut imports: IndexMap<String, VirtualContent> = IndexMap::new();
        imports.insert("my-theme/ok".into(), "".into());
        imports.insert("astro:content".into(), "".into());

        let err = VirtualResolver::new("my-theme", imports).unwrap_err();
        assert!(matches!(err, ThemeError::ReservedVirtualId { ref id, .. } if id == "astro:content"));
    }

    #[test]
    fn plugin_name_and_ids()
    {
        let r = resolver();
        assert_eq!(r.name(), "my-theme-virtual-resolver");
        assert_eq!(
            r.ids()
                .collect::<Vec<_>>(),
            vec!["my-theme/config", "my-theme/components"]
        );
        assert!(r.is_dynamic("my-theme/components"));
        assert!(!r.is_dynamic("my-theme/config"));
    }
}
