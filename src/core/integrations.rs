//! Integrations a theme injects, and which of them the user turned off.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::{debug, info};

use crate::core::{dts::LineBuffer, virtual_module::quote};

/// Outcome of resolving theme integrations against user toggles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrationsOutcome
{
    /// Everything the theme could inject
    pub possible: Vec<String>,

    /// Injected into the project
    pub injected: Vec<String>,

    /// Disabled by the user
    pub ignored: Vec<String>,

    /// Project integrations plus the injected ones
    pub existing: IndexSet<String>,
}

/// Decide which author integrations to inject. A user value of `false`
/// disables an integration; `true` or no entry keeps it.
pub fn resolve_integrations(
    author: &[String],
    user: &IndexMap<String, bool>,
    project: &[String],
) -> IntegrationsOutcome
{
    let mut outcome = IntegrationsOutcome {
        existing: project
            .iter()
            .cloned()
            .collect(),
        ..Default::default()
    };

    for name in author
    {
        if outcome
            .possible
            .contains(name)
        {
            continue;
        }

        outcome
            .possible
            .push(name.clone());

        if user.get(name) == Some(&false)
        {
            info!(integration = %name, "integration disabled by user");
            outcome
                .ignored
                .push(name.clone());
            continue;
        }

        debug!(integration = %name, "injecting integration");
        outcome
            .injected
            .push(name.clone());
        outcome
            .existing
            .insert(name.clone());
    }

    outcome
}

impl IntegrationsOutcome
{
    /// Body of the `ThemeIntegrations` entry: every possible name
    pub fn possible_types(&self) -> LineBuffer
    {
        let mut buf = LineBuffer::new();
        for name in &self.possible
        {
            buf.push(&format!("{}: true;", quote(name)), 0);
        }
        buf
    }

    /// Body of the `ThemeIntegrationsResolved` entry: injected names are
    /// `true`, disabled ones `false`
    pub fn resolved_types(&self) -> LineBuffer
    {
        let mut buf = LineBuffer::new();
        for name in &self.injected
        {
            buf.push(&format!("{}: true;", quote(name)), 0);
        }
        for name in &self.ignored
        {
            buf.push(&format!("{}: false;", quote(name)), 0);
        }
        buf
    }
}
