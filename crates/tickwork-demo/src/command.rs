//! Console command parsing

use std::str::FromStr;

use tickwork::{Priority, WorkerKind};

/// Worker selector: one worker or all of them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    One(WorkerKind),
    All,
}

impl Target {
    /// Workers addressed by this target
    pub fn kinds(&self) -> Vec<WorkerKind> {
        match self {
            Self::One(kind) => vec![*kind],
            Self::All => WorkerKind::ALL.to_vec(),
        }
    }
}

/// One console command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start(Target),
    Stop(Target),
    Pause(Target),
    Resume(Target),
    Delay(Target, i64),
    Priority(Target, Priority),
    Status,
    Help,
    Quit,
}

/// Command parsing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Unknown worker: {0} (expected animation, computation, marquee or all)")]
    UnknownWorker(String),

    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Not a number: {0}")]
    InvalidNumber(String),

    #[error(transparent)]
    InvalidPriority(#[from] tickwork::worker::ParsePriorityError),

    #[error("Unexpected argument: {0}")]
    TrailingArgument(String),
}

fn parse_target(word: Option<&str>) -> Result<Target, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument("worker"))?;
    if word.eq_ignore_ascii_case("all") {
        return Ok(Target::All);
    }
    word.parse::<WorkerKind>()
        .map(Target::One)
        .map_err(CommandError::UnknownWorker)
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or(CommandError::Empty)?.to_ascii_lowercase();

        let command = match verb.as_str() {
            "start" => Self::Start(parse_target(words.next())?),
            "stop" => Self::Stop(parse_target(words.next())?),
            "pause" => Self::Pause(parse_target(words.next())?),
            "resume" => Self::Resume(parse_target(words.next())?),
            "delay" => {
                let target = parse_target(words.next())?;
                let raw = words.next().ok_or(CommandError::MissingArgument("delay in ms"))?;
                let ms = raw
                    .parse::<i64>()
                    .map_err(|_| CommandError::InvalidNumber(raw.to_string()))?;
                Self::Delay(target, ms)
            }
            "priority" | "prio" => {
                let target = parse_target(words.next())?;
                let raw = words.next().ok_or(CommandError::MissingArgument("priority"))?;
                Self::Priority(target, raw.parse()?)
            }
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => return Err(CommandError::UnknownCommand(verb)),
        };

        match words.next() {
            Some(extra) => Err(CommandError::TrailingArgument(extra.to_string())),
            None => Ok(command),
        }
    }
}

pub const HELP: &str = "\
Commands:
  start|stop|pause|resume <worker>
  delay <worker> <ms>
  priority <worker> <min|norm|max>
  status | help | quit
Workers: animation, computation, marquee, all";
