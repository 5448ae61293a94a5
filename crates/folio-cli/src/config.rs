use clap::{Parser, Subcommand, ValueEnum};
use folio_core::config::{load_config, FolioConfig};
use folio_core::error::AppError;
use std::path::PathBuf;
use url::Url;

/// CLI configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(
    author,
    version,
    about = "Resolve the portfolio project list from proxy, document store, or static file"
)]
#[command(after_help = "Examples:
  folio list --highlights
  folio show smart-lamp
  folio url projects/smart-lamp --no-cache-bust
  folio --site-url https://studio.example.com trace")]
pub struct Config {
    /// Path to a config.toml (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Public URL of the deployed site; enables the edge proxy on custom hosts
    #[arg(long, global = true, env = "FOLIO_SITE_URL")]
    pub site_url: Option<Url>,

    /// Document store project id
    #[arg(long, global = true, env = "FIREBASE_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Document store base URL (takes precedence over the project id)
    #[arg(long, global = true, env = "FIREBASE_DB_URL")]
    pub database_url: Option<String>,

    /// Pre-obtained token forwarded as the `auth` query parameter
    #[arg(long, global = true, env = "FIREBASE_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// URL or path of the bundled projects.json
    #[arg(long, global = true, env = "FOLIO_STATIC_FILE", value_name = "PATH|URL")]
    pub static_file: Option<String>,

    /// Never try the edge proxy
    #[arg(
        long,
        global = true,
        env = "FOLIO_SKIP_PROXY",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub skip_proxy: bool,

    /// HTML page to check for the skip-proxy meta marker
    #[arg(long, global = true, value_name = "HTML_FILE")]
    pub page: Option<PathBuf>,

    /// Per-source timeout in seconds
    #[arg(long, global = true, env = "FOLIO_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve and print the project list
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
        /// Only projects flagged as highlights
        #[arg(long)]
        highlights: bool,
    },
    /// Resolve the list and print one project's detail page
    #[command(after_help = "Example: folio show smart-lamp")]
    Show {
        /// Project id
        id: String,
    },
    /// Print the document store URL for a database path
    Url {
        /// Database path (defaults to the configured path)
        path: Option<String>,
        /// Omit the cache-busting timestamp
        #[arg(long)]
        no_cache_bust: bool,
    },
    /// Resolve and print which sources were tried and how they fared
    Trace,
}

/// Supported output formats
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Standard JSON array
    Json,
    /// One project per line
    Table,
}

impl Config {
    /// Layers file configuration under the flags and environment variables.
    pub fn resolve(&self) -> Result<FolioConfig, AppError> {
        let mut config = load_config(self.config.as_deref())?;
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut FolioConfig) {
        if let Some(site_url) = &self.site_url {
            config.proxy.site_url = Some(site_url.clone());
        }
        if let Some(project_id) = &self.project_id {
            config.source.project_id = Some(project_id.clone());
        }
        if let Some(database_url) = &self.database_url {
            config.source.database_base_url = Some(database_url.clone());
        }
        if let Some(token) = &self.auth_token {
            config.source.auth_token = Some(token.clone());
        }
        if let Some(location) = &self.static_file {
            config.static_file.location = Some(location.clone());
        }
        if self.skip_proxy {
            config.proxy.skip = true;
        }
        if let Some(secs) = self.timeout_secs {
            config.http.timeout_secs = secs;
        }
    }
}
