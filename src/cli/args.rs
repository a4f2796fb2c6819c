//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

/// Order Eat - food ordering backend
#[derive(Parser, Debug)]
#[command(name = "order-eat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Manage background jobs
    Jobs(JobsArgs),

    /// Administrative tasks
    Admin(AdminArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to (overrides SERVER_HOST)
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to listen on (overrides SERVER_PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Skip applying pending migrations on startup
    #[arg(long)]
    pub skip_migrations: bool,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the jobs command
#[derive(Parser, Debug)]
pub struct JobsArgs {
    #[command(subcommand)]
    pub action: JobsAction,
}

/// Job management actions
#[derive(Subcommand, Debug)]
pub enum JobsAction {
    /// Start the payment expiry worker
    Work,
    /// List queued jobs by status
    List,
    /// Clear failed jobs
    Clear,
}

/// Arguments for the admin command
#[derive(Parser, Debug)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub action: AdminAction,
}

/// Admin actions
#[derive(Subcommand, Debug)]
pub enum AdminAction {
    /// Create an administrator account
    Create {
        #[arg(long)]
        email: String,
        /// Falls back to ADMIN_PASSWORD so it stays out of shell history
        #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "Administrator")]
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_admin_create() {
        let cli = Cli::parse_from([
            "order-eat",
            "admin",
            "create",
            "--email",
            "root@ordereat.vn",
            "--password",
            "supersecret",
        ]);

        match cli.command {
            Commands::Admin(AdminArgs {
                action: AdminAction::Create { email, name, .. },
            }) => {
                assert_eq!(email, "root@ordereat.vn");
                assert_eq!(name, "Administrator");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::parse_from(["order-eat", "serve", "--port", "8080", "--skip-migrations"]);

        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(8080));
                assert!(args.skip_migrations);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
