//! FlowSync CLI - Task board, calendar and daily insights
//!
//! Usage:
//!   flowsync init                       Initialize database
//!   flowsync tasks add "Write report"   Add a task
//!   flowsync insights                   Evaluate today's insights
//!   flowsync serve --port 3000          Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config_path = cli.config.as_deref();
    let user = cli.user.as_str();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
            source,
        } => {
            let config = commands::load_config(config_path, source.as_deref())?;
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
                config,
            )
            .await
        }
        Commands::Today { date } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(config_path, None)?;
            commands::cmd_today(&db, user, &config, date.as_deref()).await
        }
        Commands::Tasks { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_tasks_list(&db, user, None),
                Some(TasksAction::List { status }) => {
                    commands::cmd_tasks_list(&db, user, status.as_deref())
                }
                Some(TasksAction::Add {
                    title,
                    priority,
                    due,
                    estimate,
                    energy,
                    category,
                }) => {
                    let config = commands::load_config(config_path, None)?;
                    let options = commands::TaskOptions {
                        priority,
                        due,
                        estimate,
                        energy,
                        category,
                    };
                    commands::cmd_tasks_add(&db, user, &config, &title, options)
                }
                Some(TasksAction::Move { id, status }) => {
                    commands::cmd_tasks_move(&db, user, id, &status)
                }
                Some(TasksAction::Delete { id }) => commands::cmd_tasks_delete(&db, user, id),
            }
        }
        Commands::Events { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(config_path, None)?;
            match action {
                None => commands::cmd_events_list(&db, user, &config, None),
                Some(EventsAction::List { date }) => {
                    commands::cmd_events_list(&db, user, &config, date.as_deref())
                }
                Some(EventsAction::Add {
                    title,
                    start,
                    end,
                    category,
                    location,
                    attendees,
                }) => commands::cmd_events_add(
                    &db,
                    user,
                    &title,
                    &start,
                    &end,
                    &category,
                    location,
                    attendees,
                ),
                Some(EventsAction::Delete { id }) => commands::cmd_events_delete(&db, user, id),
            }
        }
        Commands::Appointments { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_appointments_list(&db, user, None),
                Some(AppointmentsAction::List { status }) => {
                    commands::cmd_appointments_list(&db, user, status.as_deref())
                }
                Some(AppointmentsAction::Request {
                    client,
                    service,
                    at,
                    duration,
                    email,
                    notes,
                }) => commands::cmd_appointments_request(
                    &db, user, &client, &service, &at, duration, email, notes,
                ),
                Some(AppointmentsAction::Confirm { id }) => {
                    commands::cmd_appointments_confirm(&db, user, id)
                }
                Some(AppointmentsAction::Decline { id }) => {
                    commands::cmd_appointments_decline(&db, user, id)
                }
            }
        }
        Commands::Services => commands::cmd_services(),
        Commands::Slots { service, date } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(config_path, None)?;
            commands::cmd_slots(&db, user, &config, &service, date.as_deref())
        }
        Commands::Insights { date, source, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(config_path, source.as_deref())?;
            commands::cmd_insights(&db, user, &config, date.as_deref(), json).await
        }
        Commands::Config => {
            let config = commands::load_config(config_path, None)?;
            commands::cmd_config(&config, config_path)
        }
    }
}
