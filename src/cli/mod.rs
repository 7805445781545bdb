// CLI module for administrative operations that run against the databases directly

pub mod admin;
pub mod migrate;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::app_data::AppData;
use crate::types::internal::SchoolCode;

/// Timetabling portal server and administration CLI
#[derive(Parser, Debug)]
#[command(name = "timetable-portal")]
#[command(about = "University timetabling portal backend", long_about = None)]
pub struct Cli {
    /// Defaults to `serve` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Start the HTTP server
    Serve,

    /// Run pending migrations on the portal and audit databases
    Migrate,

    /// Create a user
    AddUser {
        #[arg(long)]
        code: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        /// Free-text school entered at registration
        #[arg(long)]
        schools: Option<String>,
        /// Role name, repeatable
        #[arg(long = "role")]
        roles: Vec<String>,
    },

    /// Replace a user's roles and re-derive the home school
    AssignRoles {
        #[arg(long)]
        code: String,
        /// Role name, repeatable; e.g. --role "Faculty Admin - SCES"
        #[arg(long = "role", required = true)]
        roles: Vec<String>,
    },

    /// Print an access token for a user (development)
    IssueToken {
        #[arg(long)]
        code: String,
    },

    /// Create a unit owned by a school
    AddUnit {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        school: SchoolCode,
        /// Seats per group, overriding ENROLLMENT_GROUP_CAPACITY
        #[arg(long)]
        group_capacity: Option<i32>,
    },

    /// Create a semester
    AddSemester {
        #[arg(long)]
        name: String,
    },
}

impl Commands {
    /// Name recorded in CLI session audit events
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Serve => "serve",
            Commands::Migrate => "migrate",
            Commands::AddUser { .. } => "add-user",
            Commands::AssignRoles { .. } => "assign-roles",
            Commands::IssueToken { .. } => "issue-token",
            Commands::AddUnit { .. } => "add-unit",
            Commands::AddSemester { .. } => "add-semester",
        }
    }
}

/// Execute an administrative command
///
/// `serve` and `migrate` are handled by `main` before AppData exists and are
/// rejected here.
///
/// # Arguments
/// * `command` - Parsed subcommand
/// * `app_data` - Application data containing all stores and providers
pub async fn execute_command(
    command: Commands,
    app_data: Arc<AppData>,
) -> Result<(), Box<dyn std::error::Error>> {
    admin::run(command, app_data).await
}
