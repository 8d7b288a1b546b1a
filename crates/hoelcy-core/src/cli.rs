use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::filter::SortMode;

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "hoelcy",
    version,
    about = "Hoelcy: tasks, categories and coding projects behind your webhooks",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(long = "data", global = true)]
    pub data: Option<PathBuf>,

    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Work with tasks (default: list)
    #[command(subcommand)]
    Tasks(TaskCommand),
    #[command(subcommand)]
    Categories(CategoryCommand),
    #[command(subcommand)]
    Priorities(PriorityCommand),
    #[command(subcommand)]
    Projects(ProjectCommand),
    /// Show or change the webhook endpoints
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args, Debug, Clone, Default)]
pub struct TaskListArgs {
    /// Category id, or `All`
    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub archived: bool,

    #[arg(long = "due-today")]
    pub due_today: bool,

    #[arg(long)]
    pub search: Option<String>,

    #[arg(long, value_enum)]
    pub sort: Option<SortMode>,

    /// Print the detail view of every listed task
    #[arg(long)]
    pub detail: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TaskCommand {
    List(TaskListArgs),
    Add {
        name: String,
        #[arg(long)]
        category: i64,
        /// `today`, `tomorrow`, `+Nd` or an ISO date
        #[arg(long, default_value = "tomorrow")]
        due: String,
        /// Defaults to the lowest priority
        #[arg(long)]
        priority: Option<i64>,
        #[arg(long)]
        description: Option<String>,
    },
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<i64>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        priority: Option<i64>,
    },
    /// Toggle done
    Done { id: i64 },
    /// Toggle archived
    Archive {
        id: i64,
        #[arg(short = 'y', long)]
        yes: bool,
    },
    Delete {
        id: i64,
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Replace the description
    Describe { id: i64, text: String },
    Show { id: i64 },
    /// Hand the task to the coding agent
    Send {
        id: i64,
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum CategoryCommand {
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        detail: bool,
    },
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        repository: Option<String>,
        #[arg(long)]
        branch: Option<String>,
    },
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        repository: Option<String>,
        #[arg(long)]
        branch: Option<String>,
    },
    Delete {
        id: i64,
        #[arg(short = 'y', long)]
        yes: bool,
    },
    Show { id: i64 },
}

#[derive(Subcommand, Debug, Clone)]
pub enum PriorityCommand {
    List,
    Add {
        name: String,
        #[arg(long)]
        level: i64,
        #[arg(long, default_value = "#999999")]
        color: String,
    },
    Delete {
        id: i64,
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProjectCommand {
    List {
        #[arg(long)]
        branch: Option<String>,
    },
    Add {
        name: String,
        #[arg(long)]
        repository: String,
        #[arg(long)]
        branch: String,
    },
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        repository: Option<String>,
        #[arg(long)]
        branch: Option<String>,
    },
    Delete {
        id: i64,
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    Show,
    /// Set endpoints, e.g. `tasks=https://...`
    Set {
        #[arg(
            required = true,
            value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>())
        )]
        pairs: Vec<KeyVal>,
    },
    Clear,
    /// Print the placeholder endpoints
    Default,
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Command, ConfigCommand, GlobalCli, TaskCommand};
    use crate::filter::SortMode;

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = GlobalCli::try_parse_from(["hoelcy", "-vv"]).expect("parse");
        assert_eq!(cli.verbose, 2);
        assert!(cli.command.is_none());
    }

    #[test]
    fn task_list_flags() {
        let cli = GlobalCli::try_parse_from([
            "hoelcy",
            "tasks",
            "list",
            "--category",
            "3",
            "--due-today",
            "--sort",
            "priority",
            "--no-color",
        ])
        .expect("parse");
        assert!(cli.no_color);
        let Some(Command::Tasks(TaskCommand::List(args))) = cli.command else {
            panic!("expected tasks list");
        };
        assert_eq!(args.category.as_deref(), Some("3"));
        assert!(args.due_today);
        assert!(!args.archived);
        assert_eq!(args.sort, Some(SortMode::Priority));
    }

    #[test]
    fn task_add_defaults_due_to_tomorrow() {
        let cli = GlobalCli::try_parse_from(["hoelcy", "tasks", "add", "Write docs", "--category", "2"])
            .expect("parse");
        let Some(Command::Tasks(TaskCommand::Add { name, due, priority, .. })) = cli.command else {
            panic!("expected tasks add");
        };
        assert_eq!(name, "Write docs");
        assert_eq!(due, "tomorrow");
        assert_eq!(priority, None);
    }

    #[test]
    fn config_set_takes_pairs() {
        let cli = GlobalCli::try_parse_from([
            "hoelcy",
            "config",
            "set",
            "tasks=https://h.example.com/tasks",
            "coding-agent = https://h.example.com/agent",
        ])
        .expect("parse");
        let Some(Command::Config(ConfigCommand::Set { pairs })) = cli.command else {
            panic!("expected config set");
        };
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].key, "coding-agent");
        assert_eq!(pairs[1].value, "https://h.example.com/agent");

        assert!(GlobalCli::try_parse_from(["hoelcy", "config", "set", "tasks"]).is_err());
    }
}
