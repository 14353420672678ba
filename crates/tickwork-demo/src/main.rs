//! tickwork demo - console control surface for the three workers

mod command;
mod console;

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tickwork::{Config, Controller, ProgressLog, ProgressSink};
use tracing_subscriber::EnvFilter;

use command::{Command, HELP};
use console::{FrameLogger, MarqueeLogger};

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?
        }
        None => Config::default(),
    };
    config.validate()?;
    Ok(config)
}

fn dispatch(controller: &Controller, command: Command) {
    match command {
        Command::Start(target) => {
            for kind in target.kinds() {
                controller.worker(kind).start();
            }
        }
        Command::Stop(target) => {
            for kind in target.kinds() {
                controller.worker(kind).stop();
            }
        }
        Command::Pause(target) => {
            for kind in target.kinds() {
                controller.worker(kind).set_paused(true);
            }
        }
        Command::Resume(target) => {
            for kind in target.kinds() {
                controller.worker(kind).set_paused(false);
            }
        }
        Command::Delay(target, ms) => {
            for kind in target.kinds() {
                controller.worker(kind).set_delay_ms(ms);
            }
        }
        Command::Priority(target, priority) => {
            for kind in target.kinds() {
                controller.worker(kind).set_priority(priority);
            }
        }
        Command::Status => {
            for status in controller.status() {
                println!("{status}");
            }
            let frames = controller.frame_stats();
            println!(
                "frames: {} published, {} consumed, {} dropped, {} pending",
                frames.published,
                frames.consumed,
                frames.dropped(),
                u8::from(frames.pending)
            );
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config_path = std::env::args().nth(1);
    let config = load_config(config_path.as_deref().map(Path::new))?;

    let log = Arc::new(ProgressLog::new(config.progress_capacity));
    let sink_log = Arc::clone(&log);
    let sink = move |line: &str| {
        sink_log.emit(line);
        println!("{line}");
    };

    let columns = (config.marquee.visible_width / config.marquee.glyph_width).max(1) as usize;
    let marquee = MarqueeLogger::new(columns, config.marquee.glyph_width);
    let controller = Controller::new(config, FrameLogger::default(), marquee, Arc::new(sink));

    println!("{HELP}");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => dispatch(&controller, command),
            Err(err) => println!("{err}"),
        }
    }

    controller.shutdown();
    tracing::info!(lines = log.line_count(), "progress log retained");
    Ok(())
}
