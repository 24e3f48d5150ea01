use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "modeparm")]
#[command(about = "Query and change SCSI mode page parameters")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Specify configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit log records as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the known mode pages and fields (no device access)
    List {
        /// Include fields not shown by default
        #[arg(short, long)]
        all: bool,

        /// Only this page: acronym (e.g. ca) or hex page[,subpage]
        #[arg(short, long, value_name = "PAGE")]
        page: Option<String>,

        /// Show full descriptions
        #[arg(short, long)]
        long: bool,
    },

    /// Show mode page fields with changeable, default and saved values
    Show {
        /// Device path (e.g. /dev/sg0 or \\.\PhysicalDrive0)
        #[arg(value_name = "DEVICE")]
        device: Option<String>,

        /// Include fields not shown by default
        #[arg(short, long)]
        all: bool,

        /// Only this page: acronym (e.g. ca) or hex page[,subpage]
        #[arg(short, long, value_name = "PAGE")]
        page: Option<String>,

        /// Show field descriptions
        #[arg(short, long)]
        long: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Use 6 byte MODE SENSE/SELECT
        #[arg(long)]
        six: bool,
    },

    /// Print field values, e.g. "WCE,RCD" or "0x2:2:1" with --page
    Get {
        /// Comma separated ACRONYM or byte:bit:width list
        #[arg(value_name = "FIELDS")]
        fields: String,

        /// Device path
        #[arg(value_name = "DEVICE")]
        device: Option<String>,

        /// Page the fields belong to
        #[arg(short, long, value_name = "PAGE")]
        page: Option<String>,

        /// Also show changeable, default and saved values
        #[arg(short, long)]
        long: bool,

        /// Print current/changeable/default/saved columns in hex
        #[arg(short = 'H', long, conflicts_with = "json")]
        hex: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Use 6 byte MODE SENSE/SELECT
        #[arg(long)]
        six: bool,
    },

    /// Set fields, e.g. "WCE=1,RCD=0"; a field without a value is set to all ones
    Set {
        /// Comma separated ACRONYM[=value] or byte:bit:width[=value] list
        #[arg(value_name = "FIELDS")]
        fields: String,

        /// Device path
        #[arg(value_name = "DEVICE")]
        device: Option<String>,

        /// Page the fields belong to
        #[arg(short, long, value_name = "PAGE")]
        page: Option<String>,

        /// Also store the page in the device's saved values
        #[arg(short, long)]
        save: bool,

        /// Show the MODE SELECT parameter list without sending it
        #[arg(long)]
        dummy: bool,

        /// Use 6 byte MODE SENSE/SELECT
        #[arg(long)]
        six: bool,
    },

    /// Clear fields to zero
    Clear {
        /// Comma separated ACRONYM or byte:bit:width list
        #[arg(value_name = "FIELDS")]
        fields: String,

        /// Device path
        #[arg(value_name = "DEVICE")]
        device: Option<String>,

        /// Page the fields belong to
        #[arg(short, long, value_name = "PAGE")]
        page: Option<String>,

        /// Also store the page in the device's saved values
        #[arg(short, long)]
        save: bool,

        /// Show the MODE SELECT parameter list without sending it
        #[arg(long)]
        dummy: bool,

        /// Use 6 byte MODE SENSE/SELECT
        #[arg(long)]
        six: bool,
    },

    /// Restore a page to the device's default values
    Defaults {
        /// Page to restore
        #[arg(short, long, value_name = "PAGE")]
        page: String,

        /// Device path
        #[arg(value_name = "DEVICE")]
        device: Option<String>,

        /// Also store the page in the device's saved values
        #[arg(short, long)]
        save: bool,

        /// Show the MODE SELECT parameter list without sending it
        #[arg(long)]
        dummy: bool,

        /// Use 6 byte MODE SENSE/SELECT
        #[arg(long)]
        six: bool,
    },

    /// Print the device's INQUIRY identity
    Inquiry {
        /// Device path
        #[arg(value_name = "DEVICE")]
        device: Option<String>,
    },
}

impl Cli {
    pub fn parse_args() -> std::result::Result<Self, clap::Error> {
        Self::try_parse()
    }
}
