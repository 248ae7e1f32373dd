//! Command handlers

pub mod auth;
pub mod data;
pub mod parse;

use anyhow::{Context, Result};
use log::debug;
use std::sync::Arc;

use super::{Cli, Commands, OutputFormat};
use strapi_refine::api::{AuthProvider, DataProvider, FileTokenStore, HttpTransport, ProviderError, Session};
use strapi_refine::config::Config;

/// Providers and settings shared by every handler
pub struct App {
    pub config: Config,
    pub data: DataProvider,
    pub auth: AuthProvider,
    pub format: OutputFormat,
}

impl App {
    pub fn new(config: Config, store: FileTokenStore, format: OutputFormat) -> Result<Self> {
        let transport = HttpTransport::new(config.endpoint.clone(), config.timeout())
            .context("Failed to build HTTP client")?;
        let session = Session::new(Arc::new(store), config.token_key.clone());
        let data = DataProvider::new(Arc::new(transport), session);
        let auth = AuthProvider::new(data.clone()).with_allowed_roles(config.allowed_roles.clone());

        Ok(Self {
            config,
            data,
            auth,
            format,
        })
    }

    /// Print a value in the selected output format
    pub fn print<T: serde::Serialize>(&self, value: &T) -> Result<()> {
        let output = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(value),
            OutputFormat::JsonCompact => serde_json::to_string(value),
        }
        .context("Failed to format JSON output")?;
        println!("{}", output);
        Ok(())
    }
}

/// Resolve configuration, build the providers and dispatch the command
pub async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }

    let store = FileTokenStore::new(cli.session_file.unwrap_or_else(FileTokenStore::default_path));
    debug!("Session file: {}", store.path().display());
    let app = App::new(config, store, cli.format)?;

    dispatch(&app, cli.command).await.map_err(|e| {
        if needs_login(&e) {
            e.context("Not signed in or not allowed; run `strapi-refine login`")
        } else {
            e
        }
    })
}

/// Whether a command failed because of the session rather than the request
fn needs_login(error: &anyhow::Error) -> bool {
    error
        .chain()
        .any(|cause| cause.downcast_ref::<ProviderError>().is_some_and(ProviderError::is_authorization))
}

async fn dispatch(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::Login { username, password } => auth::login(app, username, password).await,
        Commands::Logout => auth::logout(app).await,
        Commands::Status => auth::status(app).await,
        Commands::Whoami => auth::whoami(app).await,
        Commands::Permissions => auth::permissions(app).await,
        Commands::List {
            resource,
            page,
            page_size,
            sort,
            filter,
            meta,
        } => data::list(app, &resource, page, page_size, &sort, &filter, meta).await,
        Commands::Get { resource, id, meta } => data::get(app, &resource, &id, meta).await,
        Commands::GetMany { resource, ids, meta } => data::get_many(app, &resource, ids, meta).await,
        Commands::Create { resource, data, meta } => data::create(app, &resource, &data, meta).await,
        Commands::Update {
            resource,
            ids,
            data,
            meta,
        } => data::update(app, &resource, ids, &data, meta).await,
        Commands::Delete { resource, ids, meta } => data::delete(app, &resource, ids, meta).await,
        Commands::Custom {
            operation,
            method,
            fields,
            variables,
            url,
            header,
        } => data::custom(app, operation, &method, fields, variables.as_deref(), url, &header).await,
        Commands::Config => app.print(&app.config),
    }
}
