//! Glob compiler: expands globs against a directory into a module object,
//! classifying each file as a side-effect import or a named export.

use camino::Utf8Path;
use indexmap::IndexMap;
use tracing::debug;

use crate::{
    core::module::ModuleObject,
    error::ThemeResult,
    infra::{path::ExtUtils, walk::FileWalker},
};

/// Expand `globs` under `root`.
///
/// Matches are enumerated in sorted path order and processed in reverse.
/// Stylesheets are appended to `imports`; every other file is assigned to
/// `exports[stem]` with its absolute path. Stems are kept as written and
/// only folded when the object is resolved. Because assignment overwrites,
/// the first match in enumeration order owns a duplicated name, while the
/// key keeps the position of its first insertion.
pub fn glob_to_module_object(
    root: &Utf8Path,
    globs: &[String],
) -> ThemeResult<ModuleObject>
{
    let files = FileWalker::new(globs)?.expand(root);

    debug!(root = %root, ?globs, matched = files.len(), "expanded module glob");

    let mut imports = Vec::new();
    let mut exports = IndexMap::new();

    for file in files
        .iter()
        .rev()
    {
        if ExtUtils::is_style(file.as_str())
        {
            imports.push(file.to_string());
            continue;
        }

        let Some(stem) = ExtUtils::stem(file)
        else
        {
            continue;
        };

        exports.insert(stem.to_string(), Some(file.to_string()));
    }

    Ok(ModuleObject { imports, exports })
}
