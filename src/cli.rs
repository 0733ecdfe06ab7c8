use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::InputError;
use crate::metadata::{PKG_DESCRIPTION, PKG_NAME, PKG_VERSION};
use crate::store::Action;
use crate::time_utils::MinuteOfDay;
use crate::types::{Medication, PlanItem, Section};

#[derive(Parser, Debug, Clone)]
#[command(name = PKG_NAME)]
#[command(version = PKG_VERSION)]
#[command(about = PKG_DESCRIPTION, long_about = None)]
pub struct Cli {
    /// Directory holding the plan snapshot and settings.json
    #[arg(long, global = true, env = "TOOTH_TIME_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show what is due next
    Status(StatusArguments),
    /// Keep running: re-check the schedule every tick and notify when something is due
    Watch(WatchArguments),
    /// Record a medication dose as taken now
    Take {
        /// paracetamol or ibuprofen
        med: Medication,
    },
    /// Mark today's slot of a timed task as done
    Done {
        /// rinse or corsodyl
        task: Section,
        /// Slot time, HH:MM
        time: MinuteOfDay,
    },
    /// Change one plan setting
    #[command(subcommand)]
    Set(SetCommand),
    /// Open an interactive editor for the plan
    Config,
    /// Manage desktop notification permission
    #[command(subcommand)]
    Notifs(NotifsCommand),
    /// Toggle the day/night palette
    Theme,
    /// Show the onboarding screens and dismiss them
    Intro,
    /// Forget all saved data and restore the default plan
    Reset {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Stop a running `watch` (using its pid file)
    Stop,
    /// Print version information
    Version,
}

#[derive(Args, Debug, Clone, Default)]
pub struct StatusArguments {
    /// Print the derived schedule as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct WatchArguments {
    /// Seconds between schedule checks (defaults to settings.json, then 15)
    #[arg(long, env = "TOOTH_TIME_TICK_SECS")]
    pub tick_secs: Option<u64>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SetCommand {
    /// Your name, used in greetings
    Name { name: String },
    /// The mascot's name, used as the notification title
    Mascot { name: String },
    /// Hours between doses
    Every { med: Medication, hours: u32 },
    /// First dose of the day, HH:MM
    Start { med: Medication, time: MinuteOfDay },
    /// Replace one time slot of a task (slots are numbered from 1)
    Slot {
        task: Section,
        slot: usize,
        time: MinuteOfDay,
    },
    /// Turn an item on
    Enable { item: PlanItem },
    /// Turn an item off
    Disable { item: PlanItem },
}

impl SetCommand {
    /// Validate the edit and turn it into a plan transition.
    pub fn into_action(self) -> Result<Action, InputError> {
        let action = match self {
            SetCommand::Name { name } => Action::SetFriendName(name),
            SetCommand::Mascot { name } => Action::SetCharacterName(name),
            SetCommand::Every { med, hours } => Action::SetEveryHours {
                med,
                hours: med.check_interval(hours)?,
            },
            SetCommand::Start { med, time } => Action::SetStart { med, start: time },
            SetCommand::Slot { task, slot, time } => {
                let len = task.slot_count();
                if slot == 0 || slot > len {
                    return Err(InputError::SlotOutOfRange {
                        section: task.key().to_string(),
                        index: slot,
                        len,
                    });
                }
                Action::SetSlot {
                    section: task,
                    index: slot - 1,
                    time,
                }
            }
            SetCommand::Enable { item } => Action::SetEnabled { item, enabled: true },
            SetCommand::Disable { item } => Action::SetEnabled {
                item,
                enabled: false,
            },
        };
        Ok(action)
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum NotifsCommand {
    /// Ask for permission to send desktop notifications
    Request,
    /// Withdraw permission
    Revoke,
    /// Show the current permission
    Status,
}
