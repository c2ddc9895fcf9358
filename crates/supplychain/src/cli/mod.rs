//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `init`: Write a default `supplychain.yaml`
//! - `list`: Print the application directory
//! - `show`: Print the supply-chain graph of one application
//! - `apis`: List the APIs one application exposes
//! - `add`: Append an application record to the data file
//! - `explore`: Navigate interactively, one gesture per stdin line
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//! - `--config`: Path to the configuration file
//!
//! # Example
//!
//! ```bash
//! supplychain list
//! supplychain show billing-core
//! supplychain add payments --name Payments --api-name PaymentAPI --upstream billing-core
//! printf 'select billing\nclick ledger\nback 0\n' | supplychain --json explore
//! ```

mod args;
mod execute;
mod gesture;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use args::{
    parse_relation, validate_app_id, validate_app_name, AddArgs, ApisArgs, ExploreArgs, InitArgs,
    ListArgs, RelationArg, ShowArgs,
};
pub use gesture::{parse_gesture, Gesture, GestureError, GESTURE_HELP};

use crate::config::CONFIG_FILE_NAME;

/// Supply-chain navigator
///
/// Explore which applications feed into and consume a given application,
/// one hop at a time.
#[derive(Parser, Debug)]
#[command(name = "supplychain")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to the configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write a default configuration file
    ///
    /// Creates the file named by `--config` with the default layout. Refuses
    /// to overwrite an existing file unless `--force` is given.
    Init(InitArgs),

    /// List known applications
    ///
    /// Each display name appears once, sorted case-insensitively.
    List(ListArgs),

    /// Show the supply chain of one application
    ///
    /// Prints the application, its upstream and downstream neighbors, and
    /// the position each node is laid out at.
    Show(ShowArgs),

    /// List the APIs an application exposes
    Apis(ApisArgs),

    /// Register an application
    ///
    /// Appends a record to the data file. Relations name existing
    /// applications by id, or introduce new ones as `id=Name`. The API
    /// endpoint defaults to one derived from the API name.
    Add(AddArgs),

    /// Navigate interactively
    ///
    /// Reads gestures from stdin, one per line: `select <id>`, `click <id>`,
    /// `back <index>`, `clear`, `help`, `quit`. Every accepted view and every
    /// failure is printed as it happens.
    Explore(ExploreArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or the command fails.
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(&self.config, args).await,
            Some(Commands::List(args)) => {
                let app = App::from_config_path(&self.config).await?;
                execute::execute_list(&app, args, output_mode).await
            }
            Some(Commands::Show(args)) => {
                let app = App::from_config_path(&self.config).await?;
                execute::execute_show(&app, args, output_mode).await
            }
            Some(Commands::Apis(args)) => {
                let app = App::from_config_path(&self.config).await?;
                execute::execute_apis(&app, args, output_mode).await
            }
            Some(Commands::Add(args)) => {
                let app = App::from_config_path(&self.config).await?;
                execute::execute_add(&app, args, output_mode).await
            }
            Some(Commands::Explore(args)) => {
                let app = App::from_config_path(&self.config).await?;
                execute::execute_explore(&app, args, output_mode).await
            }
            None => {
                println!("Supply-chain navigator");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_no_command() {
        let cli = Cli::try_parse_from(["supplychain"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
        assert_eq!(cli.config, PathBuf::from(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["supplychain", "list", "--json", "--config", "x.yaml"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, PathBuf::from("x.yaml"));
        assert!(matches!(cli.command, Some(Commands::List(_))));
    }

    #[test]
    fn test_parse_show() {
        let cli = Cli::try_parse_from(["supplychain", "show", "billing", "--lookahead"]).unwrap();
        match cli.command {
            Some(Commands::Show(args)) => {
                assert_eq!(args.id, "billing");
                assert!(args.lookahead);
            }
            _ => panic!("Expected Show command"),
        }
    }

    #[test]
    fn test_parse_show_requires_id() {
        assert!(Cli::try_parse_from(["supplychain", "show"]).is_err());
    }

    #[test]
    fn test_parse_show_rejects_blank_id() {
        assert!(Cli::try_parse_from(["supplychain", "show", "  "]).is_err());
    }

    #[test]
    fn test_parse_explore_optional_start() {
        let cli = Cli::try_parse_from(["supplychain", "explore"]).unwrap();
        match cli.command {
            Some(Commands::Explore(args)) => assert!(args.id.is_none()),
            _ => panic!("Expected Explore command"),
        }

        let cli = Cli::try_parse_from(["supplychain", "explore", "ledger"]).unwrap();
        match cli.command {
            Some(Commands::Explore(args)) => assert_eq!(args.id.as_deref(), Some("ledger")),
            _ => panic!("Expected Explore command"),
        }
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "supplychain",
            "add",
            "pay",
            "--name",
            "Payments",
            "--api-name",
            "PaymentAPI",
            "--upstream",
            "ledger,bank=Bank",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Add(args)) => {
                assert_eq!(args.id, "pay");
                assert_eq!(args.name, "Payments");
                assert_eq!(args.api_name.as_deref(), Some("PaymentAPI"));
                assert_eq!(args.upstream.len(), 2);
                assert_eq!(args.upstream[1].name.as_deref(), Some("Bank"));
                assert!(args.downstream.is_empty());
            }
            _ => panic!("Expected Add command"),
        }
    }

    #[test]
    fn test_parse_add_requires_name() {
        assert!(Cli::try_parse_from(["supplychain", "add", "pay"]).is_err());
    }

    #[test]
    fn test_parse_apis() {
        let cli = Cli::try_parse_from(["supplychain", "apis", "pay"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Apis(args)) if args.id == "pay"));
    }

    #[test]
    fn test_parse_init_force() {
        let cli = Cli::try_parse_from(["supplychain", "init", "--force"]).unwrap();
        match cli.command {
            Some(Commands::Init(args)) => {
                assert!(args.force);
                assert!(args.data_file.is_none());
            }
            _ => panic!("Expected Init command"),
        }
    }
}
