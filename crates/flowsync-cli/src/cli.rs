//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// FlowSync - Plan your day, protect your focus
#[derive(Parser)]
#[command(name = "flowsync")]
#[command(about = "Self-hosted task board, calendar and daily insights", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "flowsync.db", global = true)]
    pub db: PathBuf,

    /// User whose board and calendar to operate on
    #[arg(short, long, default_value = "local-dev", global = true)]
    pub user: String,

    /// Config file (defaults to the data-dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set FLOWSYNC_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, the server requires an identity header from the
        /// authenticating proxy or an API key.
        #[arg(long)]
        no_auth: bool,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Insight data source: live or fixture (overrides config)
        #[arg(long)]
        source: Option<String>,
    },

    /// Show today's board, calendar and insights
    Today {
        /// Local date (YYYY-MM-DD) instead of today
        #[arg(long)]
        date: Option<String>,
    },

    /// Manage tasks (list, add, move, delete)
    Tasks {
        #[command(subcommand)]
        action: Option<TasksAction>,
    },

    /// Manage calendar events (list, add, delete)
    Events {
        #[command(subcommand)]
        action: Option<EventsAction>,
    },

    /// Manage appointment requests (list, request, confirm, decline)
    Appointments {
        #[command(subcommand)]
        action: Option<AppointmentsAction>,
    },

    /// List bookable services
    Services,

    /// Show booking slots for a service
    Slots {
        /// Service id or name
        service: String,

        /// Local date (YYYY-MM-DD), today if omitted
        #[arg(long)]
        date: Option<String>,
    },

    /// Evaluate insights for a day
    Insights {
        /// Local date (YYYY-MM-DD), today if omitted
        #[arg(long)]
        date: Option<String>,

        /// Insight data source: live or fixture (overrides config)
        #[arg(long)]
        source: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config,
}

#[derive(Subcommand)]
pub enum TasksAction {
    /// List tasks
    List {
        /// Filter by status (todo, in_progress, review, done)
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Add a task
    Add {
        /// Task title
        title: String,

        /// Priority: low, medium, high, urgent
        #[arg(short, long, default_value = "medium")]
        priority: String,

        /// Due date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        due: Option<String>,

        /// Estimated duration in minutes
        #[arg(long)]
        estimate: Option<u32>,

        /// Energy cost 1-5
        #[arg(long)]
        energy: Option<u8>,

        /// Free-form category
        #[arg(long)]
        category: Option<String>,
    },

    /// Move a task to another column
    Move {
        /// Task ID
        id: i64,

        /// Target status (todo, in_progress, review, done)
        status: String,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum EventsAction {
    /// List events for a day
    List {
        /// Local date (YYYY-MM-DD), today if omitted
        #[arg(long)]
        date: Option<String>,
    },

    /// Add an event
    Add {
        /// Event title
        title: String,

        /// Start time (RFC 3339)
        #[arg(long)]
        start: String,

        /// End time (RFC 3339)
        #[arg(long)]
        end: String,

        /// Category: meeting, focus_time, task_block, break, appointment
        #[arg(short, long, default_value = "meeting")]
        category: String,

        /// Location
        #[arg(long)]
        location: Option<String>,

        /// Number of attendees
        #[arg(long)]
        attendees: Option<u32>,
    },

    /// Delete an event
    Delete {
        /// Event ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum AppointmentsAction {
    /// List appointments
    List {
        /// Filter by status (pending, confirmed, declined)
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Record a booking request
    Request {
        /// Client name
        client: String,

        /// Service id or name
        #[arg(short, long)]
        service: String,

        /// Requested start (RFC 3339)
        #[arg(long)]
        at: String,

        /// Duration in minutes (catalog duration if omitted)
        #[arg(long)]
        duration: Option<u32>,

        /// Client email
        #[arg(long)]
        email: Option<String>,

        /// Notes from the client
        #[arg(long)]
        notes: Option<String>,
    },

    /// Confirm a pending request and add it to the calendar
    Confirm {
        /// Appointment ID
        id: i64,
    },

    /// Decline a pending request
    Decline {
        /// Appointment ID
        id: i64,
    },
}
