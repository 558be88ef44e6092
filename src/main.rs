// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Inventory Client CLI
//!
//! Command-line views over the inventory backend. Each run restores the
//! stored session first, the way the browser client does on load.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use inventory_client::{
    config::Config,
    middleware::{admit, Admission},
    models::{ProductFilters, ProfileUpdate, RegisterRequest},
    routes::{LogNavigator, ADMIN_USERS_PATH, DASHBOARD_PATH, PRODUCTS_PATH, PROFILE_PATH},
    services::{oauth, FileStorage, TokenStore},
    AppState,
};
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "inventory-client", about = "Inventory management client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with email and password
    Login {
        email: String,
        #[arg(long, env = "INVENTORY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register(RegisterArgs),
    /// Sign out and forget stored credentials
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Change fields of the signed-in user's profile
    UpdateProfile(ProfileArgs),
    /// Show inventory statistics
    Dashboard,
    /// List product categories
    Categories,
    /// List products, optionally filtered
    Products(ProductArgs),
    /// List recorded sales
    Sales,
    /// List all users (admin)
    Users,
    /// Show one user (admin)
    User { id: u64 },
    /// Delete a user (admin)
    DeleteUser { id: u64 },
    /// Create an admin account (admin)
    RegisterAdmin(RegisterArgs),
    /// Print the provider sign-in URL
    OauthUrl {
        #[arg(long, default_value = DASHBOARD_PATH)]
        return_to: String,
    },
    /// Complete sign-in from the callback URL the provider redirected to
    OauthCallback { url: String },
    /// Show what the route guard does for a view path
    Route { path: String },
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    username: Option<String>,
    #[arg(long, env = "INVENTORY_PASSWORD", hide_env_values = true)]
    password: String,
    /// Password confirmation; defaults to --password
    #[arg(long)]
    password2: Option<String>,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
}

impl From<RegisterArgs> for RegisterRequest {
    fn from(args: RegisterArgs) -> Self {
        RegisterRequest {
            password2: args.password2.unwrap_or_else(|| args.password.clone()),
            email: args.email,
            username: args.username,
            password: args.password,
            first_name: args.first_name,
            last_name: args.last_name,
        }
    }
}

#[derive(Args, Debug)]
struct ProfileArgs {
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    bio: Option<String>,
}

#[derive(Args, Debug)]
struct ProductArgs {
    #[arg(long)]
    category: Option<u64>,
    #[arg(long)]
    active: Option<bool>,
    #[arg(long)]
    min_price: Option<f64>,
    #[arg(long)]
    max_price: Option<f64>,
    #[arg(long)]
    min_quantity: Option<u32>,
    #[arg(long)]
    max_quantity: Option<u32>,
    #[arg(long)]
    search: Option<String>,
    /// Only products at or below their stock threshold
    #[arg(long)]
    low_stock: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(api = %config.api_base_url, "Configuration loaded");

    let tokens = Arc::new(TokenStore::new(FileStorage::open(&config.token_store_path)));
    let state = AppState::new(config, tokens, Arc::new(LogNavigator))?;

    state.session.initialize().await;

    run(&state, cli.command).await
}

async fn run(state: &AppState, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            let user = state.session.login(&email, &password).await?;
            println!("Signed in as {} ({:?})", user.email, user.role);
        }
        Command::Register(args) => {
            let user = state
                .session
                .register(&args.into())
                .await
                .map_err(report_fields)?;
            println!("Registered and signed in as {}", user.email);
        }
        Command::Logout => {
            state.session.logout();
            println!("Signed out");
        }
        Command::Whoami => {
            guard(state, PROFILE_PATH)?;
            print_json(&state.session.state().current_user)?;
        }
        Command::UpdateProfile(args) => {
            guard(state, PROFILE_PATH)?;
            let update = ProfileUpdate {
                username: args.username,
                email: args.email,
                first_name: args.first_name,
                last_name: args.last_name,
                bio: args.bio,
            };
            print_json(&state.session.update_user(&update).await?)?;
        }
        Command::Dashboard => {
            guard(state, DASHBOARD_PATH)?;
            print_json(&state.inventory.dashboard().await?)?;
        }
        Command::Categories => {
            guard(state, DASHBOARD_PATH)?;
            print_json(&state.inventory.categories().await?.data)?;
        }
        Command::Products(args) => {
            guard(state, PRODUCTS_PATH)?;
            let envelope = if args.low_stock {
                state.inventory.low_stock().await?
            } else {
                let filters = ProductFilters {
                    category: args.category,
                    is_active: args.active,
                    min_price: args.min_price,
                    max_price: args.max_price,
                    min_quantity: args.min_quantity,
                    max_quantity: args.max_quantity,
                    low_stock: None,
                    search: args.search,
                };
                state.inventory.products(&filters).await?
            };
            print_json(&envelope.data)?;
        }
        Command::Sales => {
            guard(state, DASHBOARD_PATH)?;
            print_json(&state.inventory.sales().await?.data)?;
        }
        Command::Users => {
            guard(state, ADMIN_USERS_PATH)?;
            print_json(&state.users.list().await?.data)?;
        }
        Command::User { id } => {
            guard(state, &format!("{}/{}", ADMIN_USERS_PATH, id))?;
            print_json(&state.users.get(id).await?.data)?;
        }
        Command::DeleteUser { id } => {
            guard(state, &format!("{}/{}", ADMIN_USERS_PATH, id))?;
            state.users.delete(id).await?;
            println!("Deleted user {}", id);
        }
        Command::RegisterAdmin(args) => {
            guard(state, ADMIN_USERS_PATH)?;
            let user = state
                .users
                .register_admin(&args.into())
                .await
                .map_err(report_fields)?;
            println!("Created admin account {}", user.email);
        }
        Command::OauthUrl { return_to } => {
            println!("{}", oauth::authorize_url(&state.config, &return_to)?);
        }
        Command::OauthCallback { url } => {
            let next = oauth::handle_callback(&state.session, &url).await?;
            println!("Signed in; continue at {}", next);
        }
        Command::Route { path } => match admit(&state.session.state(), &path) {
            Admission::Render(route) => println!("render {}", route),
            Admission::Redirect(to) => println!("redirect {}", to),
            Admission::Pending => println!("pending"),
        },
    }
    Ok(())
}

/// Refuse a command whose view the route guard would not render.
fn guard(state: &AppState, path: &str) -> anyhow::Result<()> {
    match admit(&state.session.state(), path) {
        Admission::Render(_) => Ok(()),
        Admission::Redirect(to) => bail!("Not permitted for this session (redirected to {})", to),
        Admission::Pending => bail!("Session is still initializing"),
    }
}

fn report_fields(err: inventory_client::error::ClientError) -> anyhow::Error {
    if let Some(fields) = err.field_errors() {
        for (field, messages) in fields {
            eprintln!("  {}: {}", field, messages.join("; "));
        }
    }
    err.into()
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Initialize logging: JSON when `LOG_FORMAT=json`, compact text otherwise.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("inventory_client=debug,info"));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_every_subcommand_has_help() {
        let cli = Cli::command();
        for sub in cli.get_subcommands().filter(|s| s.get_name() != "help") {
            assert!(
                sub.get_about().is_some(),
                "subcommand `{}` has no help text",
                sub.get_name()
            );
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
