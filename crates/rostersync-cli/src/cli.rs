//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use rostersync::ColumnRef;
use tracing::Level;

/// RosterSync: keep an identity store in step with a user roster CSV
#[derive(Parser)]
#[command(name = "rostersync")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub logging: LogArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show headers, a preview and the detected field mapping of a CSV
    Analyze {
        /// Path to the user CSV
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of preview rows
        #[arg(long, default_value = "10")]
        rows: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what a sync would add, update and delete
    Preview {
        /// Path to the user CSV
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        roster: RosterArgs,

        #[command(flatten)]
        mapping: MappingArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reconcile a CSV with the roster and apply the result (dry run by default)
    Sync {
        /// Path to the user CSV
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        roster: RosterArgs,

        #[command(flatten)]
        mapping: MappingArgs,

        /// Write changes to the identity store (requires --store-url)
        #[arg(long)]
        execute: bool,

        /// Write the per-operation sync log as CSV
        #[arg(long, value_name = "PATH")]
        log_out: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the HTTP service
    Serve {
        #[command(flatten)]
        roster: RosterArgs,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the web server
        #[arg(short, long, env = "PORT", default_value = "8000")]
        port: u16,

        /// Allowed CORS origins, comma separated ("*" for any)
        #[arg(long, env = "CORS_ORIGINS", default_value = "*", value_delimiter = ',')]
        cors_origins: Vec<String>,

        /// Maximum request body size in bytes
        #[arg(long, default_value_t = 16 * 1024 * 1024)]
        max_upload_bytes: usize,

        /// Allow live sync requests (otherwise every execute is a dry run)
        #[arg(long)]
        allow_execute: bool,
    },
}

/// Location of the prior roster.
#[derive(Args, Debug, Clone)]
pub struct RosterArgs {
    /// Roster JSON file ({"users": [...]})
    #[arg(long, env = "ROSTERSYNC_ROSTER", value_name = "PATH")]
    pub roster: PathBuf,
}

/// Field mapping overrides. Columns are `none`, an index (`3`) or a
/// comma-separated list joined with spaces (`1,2`).
#[derive(Args, Debug, Clone, Default)]
pub struct MappingArgs {
    /// Mapping JSON file ({"name": 0, "email": 1, ...}); default is auto-detection
    #[arg(long, value_name = "PATH")]
    pub mapping: Option<PathBuf>,

    /// Email column
    #[arg(long, value_name = "COLS")]
    pub email: Option<ColumnRef>,

    /// Name column(s)
    #[arg(long, value_name = "COLS")]
    pub name: Option<ColumnRef>,

    /// Position column
    #[arg(long, value_name = "COLS")]
    pub position: Option<ColumnRef>,

    /// Department column
    #[arg(long, value_name = "COLS")]
    pub department: Option<ColumnRef>,
}

/// Identity store connection.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Base URL of the identity store REST API
    #[arg(long, global = true, env = "ROSTERSYNC_STORE_URL")]
    pub store_url: Option<String>,

    /// Bearer token for the identity store
    #[arg(long, global = true, env = "ROSTERSYNC_STORE_TOKEN", hide_env_values = true)]
    pub store_token: Option<String>,

    /// Identity store request timeout in seconds
    #[arg(long, global = true, default_value_t = rostersync::store::DEFAULT_TIMEOUT_SECS)]
    pub store_timeout_secs: u64,
}

/// Logging options.
#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log level (error, warn, info, debug, trace); overrides -v
    #[arg(long, global = true, env = "LOG_LEVEL")]
    pub log_level: Option<Level>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[default]
    Pretty,
    Compact,
    Json,
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
    fn test_parse_preview_with_mapping_overrides() {
        let cli = Cli::try_parse_from([
            "rostersync",
            "preview",
            "users.csv",
            "--roster",
            "roster.json",
            "--email",
            "2",
            "--name",
            "0,1",
            "--department",
            "none",
        ])
        .unwrap();

        match cli.command {
            Commands::Preview { mapping, .. } => {
                assert_eq!(mapping.email, Some(ColumnRef::Single(2)));
                assert_eq!(mapping.name, Some(ColumnRef::Composite(vec![0, 1])));
                assert_eq!(mapping.department, Some(ColumnRef::Absent));
                assert_eq!(mapping.position, None);
            }
            _ => panic!("expected preview"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "rostersync",
            "sync",
            "users.csv",
            "--roster",
            "roster.json",
            "--execute",
            "--store-url",
            "https://idp.example.com",
            "-vv",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.store.store_url.as_deref(), Some("https://idp.example.com"));
        assert_eq!(cli.logging.verbose, 2);
        assert_eq!(cli.logging.log_format, LogFormatArg::Json);
        assert!(matches!(cli.command, Commands::Sync { execute: true, .. }));
    }

    #[test]
    fn test_invalid_column_is_rejected() {
        let result = Cli::try_parse_from([
            "rostersync",
            "preview",
            "users.csv",
            "--roster",
            "roster.json",
            "--email",
            "first",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_serve_cors_origins_split() {
        let cli = Cli::try_parse_from([
            "rostersync",
            "serve",
            "--roster",
            "roster.json",
            "--cors-origins",
            "http://localhost:5173,https://admin.example.com",
        ])
        .unwrap();

        match cli.command {
            Commands::Serve { cors_origins, max_upload_bytes, .. } => {
                assert_eq!(cors_origins.len(), 2);
                assert_eq!(max_upload_bytes, 16 * 1024 * 1024);
            }
            _ => panic!("expected serve"),
        }
    }
}
