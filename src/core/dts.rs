//! Declaration buffer for one configuration pass.
//!
//! Collects interfaces, namespaces and ambient modules, then
//! compiles them into a single `.d.ts` text blob. Sections keep insertion
//! order; repeated names append to the same block.

use indexmap::IndexMap;

use crate::core::virtual_module::quote;

/// Lines with tab indentation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer
{
    lines: Vec<String>,
}

impl LineBuffer
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Add `text` at `depth`. Multi-line text is split; blank lines are
    /// dropped.
    pub fn push(
        &mut self,
        text: &str,
        depth: usize,
    ) -> &mut Self
    {
        for line in text
            .lines()
            .filter(|line| {
                !line
                    .trim()
                    .is_empty()
            })
        {
            self.lines
                .push(format!("{}{}", "\t".repeat(depth), line));
        }
        self
    }

    /// Add `header {`, the body one level deeper, then `}`
    pub fn push_block(
        &mut self,
        header: &str,
        body: &LineBuffer,
        depth: usize,
    ) -> &mut Self
    {
        let indent = "\t".repeat(depth);

        if body.is_empty()
        {
            self.lines
                .push(format!("{indent}{header} {{}}"));
            return self;
        }

        self.lines
            .push(format!("{indent}{header} {{"));
        for line in &body.lines
        {
            self.lines
                .push(format!("{indent}\t{line}"));
        }
        self.lines
            .push(format!("{indent}}}"));
        self
    }

    pub fn lines(&self) -> &[String]
    {
        &self.lines
    }

    pub fn is_empty(&self) -> bool
    {
        self.lines
            .is_empty()
    }
}

/// Accumulates declarations for a single pass
#[derive(Debug, Clone, Default)]
pub struct DtsBuffer
{
    interfaces: IndexMap<String, LineBuffer>,
    namespaces: IndexMap<String, LineBuffer>,
    modules: IndexMap<String, LineBuffer>,
}

impl DtsBuffer
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Append to `declare interface <name>`
    pub fn add_interface(
        &mut self,
        name: &str,
        body: &LineBuffer,
    )
    {
        Self::append(&mut self.interfaces, name, body);
    }

    /// Append to `declare namespace <name>`
    pub fn add_namespace(
        &mut self,
        name: &str,
        body: &LineBuffer,
    )
    {
        Self::append(&mut self.namespaces, name, body);
    }

    /// Append to `declare module "<name>"`. Declaring a module with an empty
    /// body still emits it, so side-effect-only modules stay importable.
    pub fn add_module(
        &mut self,
        name: &str,
        text: &str,
    )
    {
        self.modules
            .entry(name.to_string())
            .or_default()
            .push(text, 0);
    }

    fn append(
        section: &mut IndexMap<String, LineBuffer>,
        name: &str,
        body: &LineBuffer,
    )
    {
        let entry = section
            .entry(name.to_string())
            .or_default();
        entry
            .lines
            .extend(
                body.lines
                    .iter()
                    .cloned(),
            );
    }

    /// Render interfaces, namespaces, then modules. Interfaces and
    /// namespaces without lines are left out.
    pub fn compile(&self) -> String
    {
        let mut out = LineBuffer::new();

        for (name, body) in self
            .interfaces
            .iter()
            .filter(|(_, body)| !body.is_empty())
        {
            out.push_block(&format!("declare interface {name}"), body, 0);
        }

        for (name, body) in self
            .namespaces
            .iter()
            .filter(|(_, body)| !body.is_empty())
        {
            out.push_block(&format!("declare namespace {name}"), body, 0);
        }

        for (name, body) in &self.modules
        {
            out.push_block(&format!("declare module {}", quote(name)), body, 0);
        }

        if out.is_empty()
        {
            return String::new();
        }

        let mut text = out
            .lines
            .join("\n");
        text.push('\n');
        text
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn empty_buffer_compiles_to_nothing()
    {
        assert_eq!(DtsBuffer::new().compile(), "");
    }

    #[test]
    fn sections_are_ordered_and_indented()
    {
        let mut dts = DtsBuffer::new();

        dts.add_module("my-theme/layouts", "export const Base: typeof import(\"/t/Base.astro\").default;");

        let mut entry = LineBuffer::new();
        entry.push("Base: typeof import(\"/t/Base.astro\").default;", 0);
        let mut modules = LineBuffer::new();
        modules.push_block("layouts:", &entry, 0);
        let mut themes = LineBuffer::new();
        themes.push_block("\"my-theme\":", &modules, 0);
        dts.add_interface("ThemeModulesAuthored", &themes);

        dts.add_interface("Empty", &LineBuffer::new());

        assert_eq!(
            dts.compile(),
            "declare interface ThemeModulesAuthored {\n\
             \t\"my-theme\": {\n\
             \t\tlayouts: {\n\
             \t\t\tBase: typeof import(\"/t/Base.astro\").default;\n\
             \t\t}\n\
             \t}\n\
             }\n\
             declare module \"my-theme/layouts\" {\n\
             \texport const Base: typeof import(\"/t/Base.astro\").default;\n\
             }\n"
        );
    }

    #[test]
    fn empty_module_is_still_declared()
    {
        let mut dts = DtsBuffer::new();
        dts.add_module("my-theme/styles", "");
        assert_eq!(dts.compile(), "declare module \"my-theme/styles\" {}\n");
    }

    #[test]
    fn repeated_names_append()
    {
        let mut dts = DtsBuffer::new();
        dts.add_module("m", "a: 1;\n\n");
        dts.add_module("m", "b: 2;");
        assert_eq!(dts.compile(), "declare module \"m\" {\n\ta: 1;\n\tb: 2;\n}\n");
    }
}
