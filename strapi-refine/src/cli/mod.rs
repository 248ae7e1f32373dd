//! Command-line interface definitions

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "strapi-refine")]
#[command(about = "Drive a Strapi v4 GraphQL backend through the admin-panel data and auth providers")]
#[command(version)]
pub struct Cli {
    /// GraphQL endpoint, overriding config file and environment
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Session file holding the token (defaults to the user config dir)
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    /// Output format for results
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Single-line JSON
    JsonCompact,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session token
    Login {
        #[arg(short, long)]
        username: Option<String>,
        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Remove the stored session token
    Logout,
    /// Show whether a session token is stored
    Status,
    /// Show the signed-in user's identity
    Whoami,
    /// Fetch and check the signed-in user's role
    Permissions,
    /// List a collection
    List {
        resource: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        page_size: u32,
        /// Sort directive as field:order, repeatable
        #[arg(long)]
        sort: Vec<String>,
        /// Filter as field:operator=value, repeatable; value is JSON or a plain string
        #[arg(long)]
        filter: Vec<String>,
        #[command(flatten)]
        meta: MetaArgs,
    },
    /// Fetch one item
    Get {
        resource: String,
        id: String,
        #[command(flatten)]
        meta: MetaArgs,
    },
    /// Fetch several items by id
    GetMany {
        resource: String,
        #[arg(required = true)]
        ids: Vec<String>,
        #[command(flatten)]
        meta: MetaArgs,
    },
    /// Create one item per --data argument
    Create {
        resource: String,
        /// Item attributes as a JSON object, repeatable
        #[arg(long, required = true)]
        data: Vec<String>,
        #[command(flatten)]
        meta: MetaArgs,
    },
    /// Update one or more items with the same attributes
    Update {
        resource: String,
        #[arg(required = true)]
        ids: Vec<String>,
        /// Attributes as a JSON object
        #[arg(long)]
        data: String,
        #[command(flatten)]
        meta: MetaArgs,
    },
    /// Delete one or more items
    Delete {
        resource: String,
        #[arg(required = true)]
        ids: Vec<String>,
        #[command(flatten)]
        meta: MetaArgs,
    },
    /// Run an arbitrary query or mutation
    Custom {
        operation: String,
        /// get runs a query, anything else a mutation
        #[arg(long, default_value = "get")]
        method: String,
        #[arg(long)]
        fields: Vec<String>,
        /// Variables as a JSON object of {name: {value, type, required}}
        #[arg(long)]
        variables: Option<String>,
        /// Alternate endpoint; the session token is not sent there
        #[arg(long)]
        url: Option<String>,
        /// Header for the alternate endpoint as name:value, repeatable
        #[arg(long)]
        header: Vec<String>,
    },
    /// Print the resolved configuration
    Config,
}

/// Per-call overrides shared by the CRUD commands
#[derive(clap::Args, Debug, Default)]
pub struct MetaArgs {
    /// Operation name overriding the derived one
    #[arg(long)]
    pub operation: Option<String>,
    /// Field selection, repeatable; raw selections like "customer { name }" are allowed
    #[arg(long)]
    pub fields: Vec<String>,
}
