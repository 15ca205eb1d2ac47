//! rTimebill library root.
//! Exposes the CLI parser, the high-level run() function and the ledger,
//! billing and report modules.

pub mod cli;
pub mod config;
pub mod context;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::commands;
use cli::parser::{Cli, Commands};
use config::Config;
use context::RequestContext;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config, ctx: &RequestContext) -> AppResult<()> {
    let cmd = &cli.command;
    match cmd {
        Commands::Init => commands::init::handle(cli),
        Commands::Config { .. } => commands::config::handle(cmd, cfg),
        Commands::Db { .. } => commands::db::handle(cmd, cfg),
        Commands::Log { .. } => commands::log::handle(cmd, cfg),
        Commands::Profile { .. } => commands::profile::handle(cmd, cfg, ctx),
        Commands::User { .. } => commands::user::handle(cmd, cfg, ctx),
        Commands::Project { .. } => commands::project::handle(cmd, cfg, ctx),
        Commands::Task { .. } => commands::task::handle(cmd, cfg, ctx),
        Commands::Alloc { .. } => commands::alloc::handle(cmd, cfg, ctx),
        Commands::Punch { .. } => commands::punch::handle(cmd, cfg, ctx),
        Commands::Timesheet { .. } => commands::timesheet::handle(cmd, cfg, ctx),
        Commands::Bank { .. } => commands::bank::handle(cmd, cfg, ctx),
        Commands::Report { .. } => commands::report::handle(cmd, cfg, ctx),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // config is loaded once per invocation
    let mut cfg = Config::load()?;

    if let Some(custom_db) = &cli.db {
        cfg.database = utils::path::expand_tilde(custom_db)
            .to_string_lossy()
            .to_string();
    }

    let ctx = RequestContext::new(cli.as_user);
    dispatch(&cli, &cfg, &ctx)
}
