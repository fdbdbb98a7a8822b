//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

/// Pet Health API - pets, health records, appointments and subscriptions
#[derive(Parser, Debug)]
#[command(name = "pet-health-api")]
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
    /// Apply migrations and start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Create an administrator, or promote an existing account
    CreateAdmin(CreateAdminArgs),

    /// Re-derive stored vaccination and subscription statuses for today
    RefreshStatuses,
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

/// Arguments for the create-admin command
#[derive(Parser, Debug)]
pub struct CreateAdminArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[arg(long, default_value = "Admin")]
    pub first_name: String,

    #[arg(long, default_value = "User")]
    pub last_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_admin() {
        let cli = Cli::try_parse_from([
            "pet-health-api",
            "create-admin",
            "--email",
            "root@example.com",
            "--password",
            "SecurePass123!",
        ])
        .unwrap();

        match cli.command {
            Commands::CreateAdmin(args) => {
                assert_eq!(args.email, "root@example.com");
                assert_eq!(args.first_name, "Admin");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_migrate_and_verbose() {
        let cli = Cli::try_parse_from(["pet-health-api", "-v", "migrate", "status"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Migrate(MigrateArgs {
                action: MigrateAction::Status
            })
        ));
    }

    #[test]
    fn test_serve_overrides_are_optional() {
        let cli = Cli::try_parse_from(["pet-health-api", "serve", "--port", "9000"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(9000));
                assert!(args.host.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
