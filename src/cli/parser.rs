use clap::{Parser, Subcommand};

/// Command-line interface definition for mealgate
/// Canteen coupon eligibility engine over an access-control attendance store
#[derive(Parser)]
#[command(
    name = "mealgate",
    version = env!("CARGO_PKG_VERSION"),
    about = "Canteen meal-coupon engine: watch attendance swipes and grant one coupon per serving window",
    long_about = None
)]
pub struct Cli {
    /// Override ledger database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Override attendance database path
    #[arg(global = true, long = "attendance")]
    pub attendance: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the ledger database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Add missing fields with their default values")]
        migrate: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the ledger database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Register, remove or list scanner devices
    Device {
        /// Device id to register (or re-assign)
        #[arg(long = "add", value_name = "ID", requires = "role")]
        add: Option<String>,

        /// Device role: entry or canteen
        #[arg(long = "role")]
        role: Option<String>,

        #[arg(long = "remove", value_name = "ID")]
        remove: Option<String>,

        #[arg(long = "list")]
        list: bool,
    },

    /// Manage canteen serving windows
    Window {
        /// Name of the window to create
        #[arg(long = "add", value_name = "NAME", requires_all = ["start", "end"])]
        add: Option<String>,

        /// Start time (HH:MM)
        #[arg(long = "start")]
        start: Option<String>,

        /// End time (HH:MM)
        #[arg(long = "end")]
        end: Option<String>,

        #[arg(long = "desc", default_value = "")]
        desc: String,

        #[arg(long = "remove", value_name = "ID")]
        remove: Option<i64>,

        #[arg(long = "list")]
        list: bool,
    },

    /// Manage work shifts
    Shift {
        /// Name of the shift to create
        #[arg(long = "add", value_name = "NAME", requires_all = ["start", "end"])]
        add: Option<String>,

        /// Start time (HH:MM)
        #[arg(long = "start")]
        start: Option<String>,

        /// End time (HH:MM)
        #[arg(long = "end")]
        end: Option<String>,

        #[arg(long = "remove", value_name = "ID")]
        remove: Option<i64>,

        #[arg(long = "list")]
        list: bool,
    },

    /// Link a shift to a serving window (or unlink with --remove)
    Link {
        #[arg(long = "window")]
        window: i64,

        #[arg(long = "shift")]
        shift: i64,

        #[arg(long = "remove")]
        remove: bool,
    },

    /// List monitored attendance shards and their row counts
    Shards {
        #[arg(long = "json")]
        json: bool,
    },

    /// Run a single poll tick now
    Poll {
        /// Pin the wall clock (YYYY-MM-DD HH:MM[:SS]) used for window matching
        #[arg(long = "now", value_name = "DATETIME")]
        now: Option<String>,

        #[arg(long = "json")]
        json: bool,
    },

    /// Poll continuously at the configured interval
    Watch {
        /// Stop after N ticks (default: run until interrupted)
        #[arg(long = "ticks")]
        ticks: Option<u64>,

        /// Override poll interval in milliseconds
        #[arg(long = "interval")]
        interval: Option<u64>,
    },

    /// Evaluate one canteen swipe by hand
    Evaluate {
        #[arg(long = "employee")]
        employee: String,

        #[arg(long = "device")]
        device: String,

        /// Swipe time (YYYY-MM-DD HH:MM[:SS]); defaults to now
        #[arg(long = "at", value_name = "DATETIME")]
        at: Option<String>,

        /// Pin the wall clock used for window matching
        #[arg(long = "now", value_name = "DATETIME")]
        now: Option<String>,
    },

    /// List recorded coupon transactions
    Transactions {
        /// Filter by event date (YYYY-MM-DD)
        #[arg(long = "date")]
        date: Option<String>,

        #[arg(long = "employee")]
        employee: Option<String>,

        #[arg(long = "today", conflicts_with = "date")]
        today: bool,

        #[arg(long = "json")]
        json: bool,
    },
}
