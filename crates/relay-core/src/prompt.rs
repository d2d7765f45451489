use std::fmt::Write;

use relay_mcp::ToolCatalog;

/// Render the system prompt for a run: task framing plus the catalog's tool
/// listing under the names the tools are exposed as.
#[must_use]
pub fn system_prompt(catalog: &ToolCatalog, preamble: Option<&str>) -> String {
    let mut out = String::from(
        preamble.unwrap_or(
            "You are an assistant that completes tasks by calling tools from \
             connected servers. Use only the tools listed below, and reply \
             with a final answer when the task is complete.",
        ),
    );

    if catalog.is_empty() {
        return out;
    }

    out.push_str("\n\n<available_tools>\n");
    for (exposed_name, tool) in catalog.entries() {
        let _ = writeln!(
            out,
            "  <tool name=\"{exposed_name}\" server=\"{server}\">\n\
             \x20   <description>{desc}</description>\n\
             \x20   <parameters>{schema}</parameters>\n\
             \x20 </tool>",
            server = tool.server_id,
            desc = tool.description,
            schema = tool.input_schema,
        );
    }
    out.push_str("</available_tools>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_mcp::ToolDescriptor;

    fn make_tool(server: &str, name: &str, desc: &str) -> ToolDescriptor {
        ToolDescriptor {
            server_id: server.into(),
            name: name.into(),
            description: desc.into(),
            input_schema: serde_json::json!({"type": "object"}),
        }
    }

    #[test]
    fn empty_catalog_is_preamble_only() {
        let prompt = system_prompt(&ToolCatalog::default(), None);
        assert!(!prompt.contains("<available_tools>"));
    }

    #[test]
    fn lists_tools_with_exposed_names() {
        let catalog = ToolCatalog::aggregate(vec![
            make_tool("airbnb", "search_listings", "Search stays"),
            make_tool("fs", "read_file", "Read a file"),
        ]);
        let prompt = system_prompt(&catalog, None);
        assert!(prompt.contains("<available_tools>"));
        assert!(prompt.contains("name=\"search_listings\" server=\"airbnb\""));
        assert!(prompt.contains("name=\"read_file\" server=\"fs\""));
        assert!(prompt.contains("<description>Search stays</description>"));
        assert!(prompt.contains("\"type\":\"object\""));
    }

    #[test]
    fn colliding_tools_listed_qualified() {
        let catalog = ToolCatalog::aggregate(vec![
            make_tool("alpha", "search", "a"),
            make_tool("beta", "search", "b"),
        ]);
        let prompt = system_prompt(&catalog, None);
        assert!(prompt.contains("name=\"alpha:search\""));
        assert!(prompt.contains("name=\"beta:search\""));
    }

    #[test]
    fn custom_preamble_used() {
        let prompt = system_prompt(&ToolCatalog::default(), Some("Be terse."));
        assert!(prompt.starts_with("Be terse."));
    }
}
