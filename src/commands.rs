//! The built-in command set of the drover console.
//!
//! Each command declares a parameter struct, a schema over it, and a
//! handler closure. Handlers own their state (the note list, the quit
//! flag) through `Rc` captures and report through the shared
//! [`Console`], so everything here is testable without a terminal.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use drover_engine::{Field, ModelSchema, Registry, SchemaError};

use crate::console::Console;

/// Temperature scales understood by `convert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Unit {
    #[default]
    Celsius,
    Fahrenheit,
}

const UNITS: &[(&str, Unit)] = &[
    ("celsius", Unit::Celsius),
    ("fahrenheit", Unit::Fahrenheit),
];

#[derive(Debug, Default)]
struct Note {
    text: String,
    tag: String,
    pin: bool,
}

#[derive(Debug, Default)]
struct List {
    pinned: bool,
    limit: i32,
}

#[derive(Debug, Default)]
struct Convert {
    degrees: f64,
    unit: Unit,
    round: bool,
}

#[derive(Debug, Default)]
struct Wait {
    millis: i64,
    quiet: bool,
}

fn note_schema() -> ModelSchema<Note> {
    ModelSchema::new()
        .field(Field::value("text", |n: &mut Note, v: String| n.text = v).positional(0))
        .field(Field::value("tag", |n: &mut Note, v: String| n.tag = v).named(&["tag", "t"]))
        .field(Field::value("pin", |n: &mut Note, v: bool| n.pin = v).named(&["pin"]))
}

fn list_schema() -> ModelSchema<List> {
    ModelSchema::new()
        .field(Field::value("pinned", |l: &mut List, v: bool| l.pinned = v).named(&["pinned", "p"]))
        .field(Field::value("limit", |l: &mut List, v: i32| l.limit = v).named(&["limit", "n"]))
}

fn convert_schema() -> ModelSchema<Convert> {
    ModelSchema::new()
        .field(Field::value("degrees", |c: &mut Convert, v: f64| c.degrees = v).positional(0))
        .field(Field::enumeration("unit", UNITS, |c: &mut Convert, v| c.unit = v).positional(1))
        .field(Field::value("round", |c: &mut Convert, v: bool| c.round = v).named(&["round"]))
}

fn wait_schema() -> ModelSchema<Wait> {
    ModelSchema::new()
        .field(Field::value("millis", |w: &mut Wait, v: i64| w.millis = v).positional(0))
        .field(Field::value("quiet", |w: &mut Wait, v: bool| w.quiet = v).named(&["quiet", "q"]))
}

/// Register every built-in command against a fresh registry.
///
/// `quit` is the flag the REPL polls after each line; the `quit`
/// command is the only thing that sets it.
pub fn build_registry(console: Console, quit: Rc<Cell<bool>>) -> Result<Registry, SchemaError> {
    let notes: Rc<RefCell<Vec<Note>>> = Rc::default();

    let note_console = console.clone();
    let note_state = Rc::clone(&notes);
    let list_console = console.clone();
    let list_state = Rc::clone(&notes);
    let convert_console = console.clone();
    let wait_console = console;

    Registry::new()
        .with_command(
            "note",
            "record a note: note \"text\" [--tag \"word\"] [-pin]",
            note_schema(),
            move |note: Note| {
                let mut kept = note_state.borrow_mut();
                kept.push(note);
                note_console.say(format!("noted #{}", kept.len()));
            },
        )?
        .with_command(
            "list",
            "list notes: list [-pinned] [--limit n]",
            list_schema(),
            move |list: List| {
                let kept = list_state.borrow();
                let mut shown = 0;
                for (index, note) in kept.iter().enumerate() {
                    if list.pinned && !note.pin {
                        continue;
                    }
                    if list.limit > 0 && shown >= list.limit {
                        break;
                    }
                    let mut line = format!(
                        "{:>3}.{} {}",
                        index + 1,
                        if note.pin { " *" } else { "  " },
                        note.text
                    );
                    if !note.tag.is_empty() {
                        line.push_str(&format!(" [{}]", note.tag));
                    }
                    list_console.say(line);
                    shown += 1;
                }
                if shown == 0 {
                    list_console.say("nothing to list");
                }
            },
        )?
        .with_command(
            "convert",
            "convert a temperature: convert <degrees> <celsius|fahrenheit> [-round]",
            convert_schema(),
            move |convert: Convert| {
                let (out, from, to) = match convert.unit {
                    Unit::Celsius => (convert.degrees * 9.0 / 5.0 + 32.0, "C", "F"),
                    Unit::Fahrenheit => ((convert.degrees - 32.0) * 5.0 / 9.0, "F", "C"),
                };
                let out = if convert.round { out.round() } else { out };
                convert_console.say(format!("{}°{from} = {out}°{to}", convert.degrees));
            },
        )?
        .with_command(
            "wait",
            "pause the console: wait <millis> [-quiet]",
            wait_schema(),
            move |wait: Wait| {
                let millis = wait.millis.max(0) as u64;
                std::thread::sleep(Duration::from_millis(millis));
                if !wait.quiet {
                    wait_console.say(format!("waited {millis}ms"));
                }
            },
        )?
        .with_bare("quit", "leave the console", move || quit.set(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (Registry, Console, Rc<Cell<bool>>) {
        let console = Console::capture();
        let quit = Rc::new(Cell::new(false));
        let registry =
            build_registry(console.clone(), Rc::clone(&quit)).expect("built-ins register");
        (registry, console, quit)
    }

    #[test]
    fn test_note_then_list() {
        let (mut registry, console, _) = fixture();
        registry.parse_line(r#"note "feed the goats" --tag "barn""#).unwrap();
        registry.parse_line(r#"note "fix the gate" -pin"#).unwrap();
        registry.parse_line("list").unwrap();
        assert_eq!(
            console.captured(),
            vec![
                "noted #1",
                "noted #2",
                "  1.   feed the goats [barn]",
                "  2. * fix the gate",
            ]
        );
    }

    #[test]
    fn test_list_filters_and_limits() {
        let (mut registry, console, _) = fixture();
        registry.parse_line(r#"note "a" -pin"#).unwrap();
        registry.parse_line(r#"note "b""#).unwrap();
        registry.parse_line(r#"note "c" -pin"#).unwrap();
        registry.parse_line("list -pinned").unwrap();
        registry.parse_line("list --limit 1").unwrap();
        let lines = console.captured();
        assert_eq!(
            &lines[3..],
            &[
                "  1. * a",
                "  3. * c",
                "  1. * a",
            ]
        );
    }

    #[test]
    fn test_empty_list_says_so() {
        let (mut registry, console, _) = fixture();
        registry.parse_line("list").unwrap();
        assert_eq!(console.captured(), vec!["nothing to list"]);
    }

    #[test]
    fn test_convert_both_directions() {
        let (mut registry, console, _) = fixture();
        registry.parse_line("convert 100 celsius").unwrap();
        registry.parse_line("convert 32 fahrenheit").unwrap();
        registry.parse_line("convert -40 fahrenheit").unwrap();
        assert_eq!(
            console.captured(),
            vec!["100°C = 212°F", "32°F = 0°C", "-40°F = -40°C"]
        );
    }

    #[test]
    fn test_convert_round_flag() {
        let (mut registry, console, _) = fixture();
        registry.parse_line("convert 37.2 celsius -round").unwrap();
        assert_eq!(console.captured(), vec!["37.2°C = 99°F"]);
    }

    #[test]
    fn test_convert_rejects_unknown_unit() {
        let (mut registry, console, _) = fixture();
        let err = registry.parse_line("convert 10 kelvin").unwrap_err();
        assert!(err.to_string().contains("celsius, fahrenheit"));
        assert!(console.captured().is_empty());
    }

    #[test]
    fn test_wait_quiet_and_loud() {
        let (mut registry, console, _) = fixture();
        registry.parse_line("wait 0 -quiet").unwrap();
        registry.parse_line("wait 1").unwrap();
        assert_eq!(console.captured(), vec!["waited 1ms"]);
    }

    #[test]
    fn test_negative_wait_clamps_to_zero() {
        let (mut registry, console, _) = fixture();
        registry.parse_line("wait -5").unwrap();
        assert_eq!(console.captured(), vec!["waited 0ms"]);
    }

    #[test]
    fn test_quit_sets_the_flag() {
        let (mut registry, _, quit) = fixture();
        assert!(!quit.get());
        registry.parse_line("quit").unwrap();
        assert!(quit.get());
    }

    #[test]
    fn test_quit_rejects_arguments_without_quitting() {
        let (mut registry, _, quit) = fixture();
        registry.parse_line("quit -now").unwrap_err();
        assert!(!quit.get());
    }

    #[test]
    fn test_help_listing_covers_every_command() {
        let (registry, _, _) = fixture();
        let names: Vec<&str> = registry.commands().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["convert", "list", "note", "quit", "wait"]);
    }
}
