//! # Command Line Interface
//!
//! `kv-console submit` runs the new-version workflow against a Vault KV v2
//! mount; `kv-console breadcrumbs` prints the version diff trail for a path.

pub mod output;
pub mod submit;

use clap::{Args, Parser, Subcommand};
use crate::breadcrumbs::{BreadcrumbBuilder, ResolvedSecret, VersionDiffRoute};
use crate::config::AppConfig;
use crate::observability::{init_logging, log_config_info};
use crate::secrets::SecretString;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "kv-console")]
#[command(about = "Create and inspect versions of Vault KV v2 secrets")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault address override (defaults to VAULT_ADDR)
    #[arg(long, global = true)]
    pub vault_addr: Option<String>,

    /// Vault token override (defaults to VAULT_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Vault namespace override (defaults to VAULT_NAMESPACE)
    #[arg(long, global = true)]
    pub namespace: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a new version of a secret
    Submit(SubmitArgs),

    /// Print the breadcrumb trail of the version diff view
    Breadcrumbs {
        /// KV v2 mount path
        #[arg(long)]
        backend: String,

        /// Secret path within the mount
        #[arg(long)]
        path: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SubmitArgs {
    /// KV v2 mount path
    #[arg(long)]
    pub backend: String,

    /// Secret path within the mount
    #[arg(long)]
    pub path: String,

    /// Secret data as a JSON object
    #[arg(long)]
    pub data: String,

    /// Check-and-set version; the write fails if the secret moved past it
    #[arg(long)]
    pub cas: Option<u64>,

    /// Version the data was copied from
    #[arg(long)]
    pub previous_version: Option<u64>,

    /// Latest version known to exist
    #[arg(long)]
    pub current_version: Option<u64>,
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(&cli)?;
    init_logging(&config.observability)?;
    log_config_info(&config);

    match cli.command {
        Commands::Submit(args) => submit::handle_submit(args, &config, cli.output).await?,
        Commands::Breadcrumbs { backend, path } => {
            let route = VersionDiffRoute::enter(
                &BreadcrumbBuilder::default(),
                ResolvedSecret::new(backend, path),
            );
            output::print_output(&route.breadcrumbs(), cli.output)?
        }
    }

    Ok(())
}

/// Environment configuration with command-line overrides applied.
fn resolve_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::from_env()?;

    if let Some(addr) = &cli.vault_addr {
        config.vault.address = addr.clone();
    }
    if let Some(token) = &cli.token {
        config.vault.token = Some(SecretString::new(token.as_str()));
    }
    if let Some(namespace) = &cli.namespace {
        config.vault.namespace = Some(namespace.clone());
    }
    if cli.verbose {
        config.observability.log_level = "debug".to_string();
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_submit() {
        let cli = Cli::try_parse_from([
            "kv-console",
            "submit",
            "--backend",
            "kv",
            "--path",
            "app/db",
            "--data",
            r#"{"user":"admin"}"#,
            "--previous-version",
            "1",
            "--current-version",
            "2",
            "--verbose",
        ])
        .unwrap();

        assert!(cli.verbose);
        let Commands::Submit(args) = cli.command else { panic!("expected submit") };
        assert_eq!(args.path, "app/db");
        assert_eq!(args.previous_version, Some(1));
        assert_eq!(args.current_version, Some(2));
        assert_eq!(args.cas, None);
    }

    #[test]
    fn test_parse_breadcrumbs_yaml() {
        let cli = Cli::try_parse_from([
            "kv-console",
            "--output",
            "yaml",
            "breadcrumbs",
            "--backend",
            "kv",
            "--path",
            "app/",
        ])
        .unwrap();

        assert_eq!(cli.output, OutputFormat::Yaml);
        assert!(matches!(cli.command, Commands::Breadcrumbs { .. }));
    }
}
