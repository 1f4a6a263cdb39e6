//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::EventLevel;
use crate::hold::HoldKind;

/// FieldOps - field operations console
#[derive(Parser)]
#[command(
    name = "fo",
    about = "Field operations console for rescue squad coordination",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Manage events
    Event {
        #[command(subcommand)]
        command: EventCommand,
    },

    /// Manage teams
    Team {
        #[command(subcommand)]
        command: TeamCommand,
    },

    /// Manage volunteer profiles
    Volunteer {
        #[command(subcommand)]
        command: VolunteerCommand,
    },

    /// Manage health points
    Hp {
        #[command(subcommand)]
        command: HpCommand,
    },

    /// Show team status for an event
    Status {
        /// Event to show
        event_id: String,
    },

    /// Drive a hold-and-confirm transition from the terminal
    Simulate {
        /// Team to operate on
        team_id: String,

        /// Action to hold for (start, terminate, transfer)
        action: SimAction,

        /// Destination health point name or id (transfer only)
        #[arg(short, long)]
        destination: Option<String>,

        /// Divide hold durations by this factor
        #[arg(long, default_value = "10")]
        time_scale: u64,
    },
}

/// Event subcommands
#[derive(Subcommand)]
pub enum EventCommand {
    /// Create a new event
    Create {
        /// Event name
        name: String,

        /// Where the event takes place
        #[arg(short, long)]
        location: String,

        /// Calendar date
        #[arg(long)]
        date: Option<String>,

        /// Expected intensity (low, medium, high)
        #[arg(long)]
        level: Option<EventLevel>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List events, newest first
    List,

    /// Delete an event
    Delete {
        event_id: String,
    },
}

/// Team subcommands
#[derive(Subcommand)]
pub enum TeamCommand {
    /// Create a team for an event
    Create {
        /// Owning event
        event_id: String,

        /// Team name; generated (SAP-NNN) when omitted
        #[arg(short, long)]
        name: Option<String>,

        /// Volunteer ids to assign immediately
        #[arg(short, long, num_args = 0..)]
        members: Vec<String>,
    },

    /// List teams for an event
    List {
        event_id: String,

        /// Include member details
        #[arg(short, long)]
        detailed: bool,
    },

    /// Replace a team's member list
    Assign {
        team_id: String,

        /// Volunteer ids
        #[arg(num_args = 1..)]
        volunteers: Vec<String>,
    },

    /// Delete a team, unassigning its members
    Delete {
        team_id: String,
    },
}

/// Volunteer subcommands
#[derive(Subcommand)]
pub enum VolunteerCommand {
    /// Register or update a volunteer profile
    Register {
        /// Identity-provider user id
        id: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        qualification: Option<String>,

        #[arg(long)]
        phone: Option<String>,
    },

    /// List volunteers with assignment state
    List,
}

/// Health point subcommands
#[derive(Subcommand)]
pub enum HpCommand {
    /// Register a health point for an event
    Register {
        event_id: String,
        name: String,
    },

    /// List health points for an event
    List {
        event_id: String,
    },
}

/// Action selector for the simulator
#[derive(Clone, Copy, Debug)]
pub enum SimAction {
    Start,
    Terminate,
    Transfer,
}

impl SimAction {
    pub fn hold_kind(&self) -> HoldKind {
        match self {
            Self::Start => HoldKind::Start,
            Self::Terminate => HoldKind::Terminate,
            Self::Transfer => HoldKind::Transfer,
        }
    }
}

impl std::str::FromStr for SimAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "terminate" | "end" => Ok(Self::Terminate),
            "transfer" => Ok(Self::Transfer),
            _ => Err(format!("Unknown action: {}. Use: start, terminate, or transfer", s)),
        }
    }
}

impl std::fmt::Display for SimAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Terminate => write!(f, "terminate"),
            Self::Transfer => write!(f, "transfer"),
        }
    }
}
