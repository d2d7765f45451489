use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use relay_mcp::{ServersDocument, SessionManager, ToolCatalog};

#[derive(Debug, Parser)]
#[command(
    name = "relay",
    version,
    about = "Inspect and exercise a fleet of MCP tool servers"
)]
struct Cli {
    /// Path to the mcpServers configuration file.
    #[arg(short, long, default_value = "servers.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Connect all configured servers and print the aggregated tool catalog.
    Tools,
    /// Invoke one tool by its exposed name (bare or server-qualified).
    Call {
        name: String,
        /// JSON arguments for the tool.
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let doc = ServersDocument::from_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let manager = SessionManager::new(doc.into_configs());

    let result = tokio::select! {
        r = execute(&manager, cli.command) => r,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted");
            Ok(())
        }
    };

    manager.shutdown_all().await;
    result
}

async fn execute(manager: &SessionManager, command: Command) -> anyhow::Result<()> {
    let report = manager.connect_all().await;
    for failure in &report.failures {
        tracing::warn!(
            server_id = failure.server_id,
            "server unavailable, catalog degraded: {:#}",
            failure.error
        );
    }
    if !manager.has_active_sessions().await {
        bail!("no servers could be reached");
    }

    let catalog = ToolCatalog::aggregate(report.tools);

    match command {
        Command::Tools => {
            for (exposed_name, tool) in catalog.entries() {
                if tool.description.is_empty() {
                    println!("{exposed_name}  [{}]", tool.server_id);
                } else {
                    println!("{exposed_name}  [{}]  {}", tool.server_id, tool.description);
                }
            }
            println!(
                "{} tool(s) across {} server(s)",
                catalog.len(),
                catalog.server_ids().len()
            );
        }
        Command::Call { name, args } => {
            let tool = catalog.resolve(&name)?;
            let args: serde_json::Value =
                serde_json::from_str(&args).context("parsing --args as JSON")?;
            let outcome = manager.call_tool(&tool.server_id, &tool.name, args).await?;
            if outcome.is_error {
                bail!("tool reported an error: {}", outcome.content);
            }
            println!("{}", outcome.content);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tools_subcommand() {
        let cli = Cli::try_parse_from(["relay", "--config", "fleet.json", "tools"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("fleet.json"));
        assert!(matches!(cli.command, Command::Tools));
    }

    #[test]
    fn parses_call_with_default_args() {
        let cli = Cli::try_parse_from(["relay", "call", "fs:read_file"]).unwrap();
        match cli.command {
            Command::Call { name, args } => {
                assert_eq!(name, "fs:read_file");
                assert_eq!(args, "{}");
            }
            Command::Tools => panic!("expected call"),
        }
    }

    #[test]
    fn config_defaults_to_servers_json() {
        let cli = Cli::try_parse_from(["relay", "tools"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("servers.json"));
    }
}
