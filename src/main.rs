//! drover - an interactive line-command console.
//!
//! A small REPL host around the drover-engine interpreter: read a line,
//! dispatch it through the command registry, print what the handlers
//! say, repeat until `quit` or end of input.

mod commands;
mod config;
mod console;

use std::cell::Cell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::console::Console;
use drover_engine::Registry;

fn main() -> anyhow::Result<()> {
    // Initialize tracing. The REPL shares the terminal with its own
    // output, so the default filter stays quiet.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(true)
        .init();

    // Load configuration; without an argument the defaults apply.
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path).map_err(|e| {
            error!(path = %path, error = %e, "failed to load config");
            e
        })?,
        None => Config::default(),
    };

    info!(prompt = %config.prompt, startup_lines = config.startup.len(), "starting drover");

    let console = Console::Stdout;
    let quit = Rc::new(Cell::new(false));
    let mut registry = commands::build_registry(console.clone(), Rc::clone(&quit))
        .map_err(|e| {
            error!(error = %e, "defective command declaration");
            e
        })?;

    if config.banner {
        console.say(format!("drover {}", env!("CARGO_PKG_VERSION")));
        console.say("type 'help' for commands, 'quit' to leave");
    }

    for line in &config.startup {
        debug!(line = %line, "startup line");
        interpret(&mut registry, &console, line);
        if quit.get() {
            info!("quit during startup");
            return Ok(());
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        stdout.write_all(config.prompt.as_bytes())?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // End of input counts as a quiet quit.
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        debug!(line, "dispatching");
        interpret(&mut registry, &console, line);
        if quit.get() {
            break;
        }
    }

    info!("console closed");
    Ok(())
}

/// What `help` says about itself.
const HELP_ABOUT: &str = "show this list: help [command]";

/// Run one line, routing `help` (alone or with a command name) to the
/// built-in help and every error back to the user without stopping the
/// loop.
fn interpret(registry: &mut Registry, console: &Console, line: &str) {
    let mut words = line.split_whitespace();
    if words.next() == Some("help") {
        match words.next() {
            Some(topic) => print_topic_help(console, registry, topic),
            None => print_help(console, registry),
        }
        return;
    }
    if let Err(err) = registry.parse_line(line) {
        console.say(format!("error: {err}"));
    }
}

fn print_help(console: &Console, registry: &Registry) {
    console.say("commands:");
    let mut listing = registry.commands();
    listing.push(("help", HELP_ABOUT));
    listing.sort_by_key(|(name, _)| *name);
    for (name, help) in listing {
        console.say(format!("  {name:<10} {help}"));
    }
}

fn print_topic_help(console: &Console, registry: &Registry, topic: &str) {
    if topic == "help" {
        console.say(format!("help: {HELP_ABOUT}"));
        return;
    }
    match registry.help(topic) {
        Some(help) => console.say(format!("{topic}: {help}")),
        None => console.say(format!("error: unknown command: {topic}")),
    }
}
