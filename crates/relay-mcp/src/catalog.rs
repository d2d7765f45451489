use std::collections::BTreeMap;

use crate::error::McpError;
use crate::tool::ToolDescriptor;

/// How a bare tool name maps into the catalog.
#[derive(Debug, Clone)]
enum BareBinding {
    /// Only one server advertises this name.
    Unique(String),
    /// Several servers advertise it; the bare name is withdrawn and every
    /// claimant is exposed under its qualified name.
    Ambiguous,
}

/// Aggregated tool namespace across all live sessions.
///
/// A name unique across the fleet resolves bare; colliding names are only
/// reachable qualified (`server:name`). Nothing is ever shadowed: a
/// collision withdraws the bare name entirely rather than picking a winner.
/// Aggregation sorts by (server, name) first, so the result is independent
/// of input order.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    entries: BTreeMap<String, ToolDescriptor>,
    bare: BTreeMap<String, BareBinding>,
}

impl ToolCatalog {
    #[must_use]
    pub fn aggregate(tools: impl IntoIterator<Item = ToolDescriptor>) -> Self {
        let mut sorted: Vec<ToolDescriptor> = tools.into_iter().collect();
        sorted.sort_by(|a, b| (&a.server_id, &a.name).cmp(&(&b.server_id, &b.name)));
        sorted.dedup_by(|a, b| a.server_id == b.server_id && a.name == b.name);

        let mut catalog = Self::default();
        for tool in sorted {
            let qualified = tool.qualified_name();
            catalog
                .bare
                .entry(tool.name.clone())
                .and_modify(|b| *b = BareBinding::Ambiguous)
                .or_insert_with(|| BareBinding::Unique(qualified.clone()));
            catalog.entries.insert(qualified, tool);
        }
        catalog
    }

    /// Look up a tool by its exposed name, bare or qualified.
    ///
    /// # Errors
    ///
    /// Returns `McpError::UnknownTool` when the name is absent, or when a
    /// bare name is ambiguous across servers.
    pub fn resolve(&self, name: &str) -> Result<&ToolDescriptor, McpError> {
        let unknown = || McpError::UnknownTool {
            tool_name: name.into(),
        };

        if name.contains(':') {
            return self.entries.get(name).ok_or_else(unknown);
        }

        match self.bare.get(name) {
            Some(BareBinding::Unique(qualified)) => {
                self.entries.get(qualified).ok_or_else(unknown)
            }
            Some(BareBinding::Ambiguous) | None => Err(unknown()),
        }
    }

    /// Every descriptor with the name it is exposed under, in deterministic
    /// (server, name) order.
    pub fn entries(&self) -> impl Iterator<Item = (String, &ToolDescriptor)> {
        self.entries.values().map(|tool| {
            let exposed = match self.bare.get(&tool.name) {
                Some(BareBinding::Unique(_)) => tool.name.clone(),
                _ => tool.qualified_name(),
            };
            (exposed, tool)
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Server ids represented in the catalog, sorted and deduplicated.
    #[must_use]
    pub fn server_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .entries
            .values()
            .map(|t| t.server_id.as_str())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
