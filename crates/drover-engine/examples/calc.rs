//! A four-command desk calculator console.
//!
//! This example demonstrates how to:
//! - Declare schemas mixing positional, named, and required fields
//! - Register model-bound and bare commands on one registry
//! - Drive the registry line by line and report errors without stopping
//!
//! Run it and type lines such as:
//!
//! ```text
//! add 2 3.5
//! scale 10 --by 3
//! round -2.7182 Down
//! quit
//! ```

use std::cell::Cell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use drover_engine::{Field, ModelSchema, Registry, SchemaError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Direction {
    Up,
    Down,
    #[default]
    Nearest,
}

#[derive(Debug, Default)]
struct Add {
    a: f64,
    b: f64,
}

#[derive(Debug, Default)]
struct Scale {
    value: f64,
    by: f64,
    invert: bool,
}

#[derive(Debug, Default)]
struct Round {
    value: f64,
    direction: Direction,
}

fn build_registry(done: Rc<Cell<bool>>) -> Result<Registry, SchemaError> {
    Registry::new()
        .with_command(
            "add",
            "add two numbers",
            ModelSchema::new()
                .field(Field::value("a", |m: &mut Add, v: f64| m.a = v).positional(0))
                .field(Field::value("b", |m: &mut Add, v: f64| m.b = v).positional(1)),
            |m: Add| println!("= {}", m.a + m.b),
        )?
        .with_command(
            "scale",
            "multiply a value by a required factor",
            ModelSchema::new()
                .field(Field::value("value", |m: &mut Scale, v: f64| m.value = v).positional(0))
                .field(
                    Field::value("by", |m: &mut Scale, v: f64| m.by = v)
                        .named(&["by", "factor"])
                        .required(),
                )
                .field(Field::value("invert", |m: &mut Scale, v: bool| m.invert = v).named(&[])),
            |m: Scale| {
                let factor = if m.invert { 1.0 / m.by } else { m.by };
                println!("= {}", m.value * factor);
            },
        )?
        .with_command(
            "round",
            "round a value Up, Down, or Nearest",
            ModelSchema::new()
                .field(Field::value("value", |m: &mut Round, v: f64| m.value = v).positional(0))
                .field(
                    Field::enumeration(
                        "direction",
                        &[
                            ("Up", Direction::Up),
                            ("Down", Direction::Down),
                            ("Nearest", Direction::Nearest),
                        ],
                        |m: &mut Round, v| m.direction = v,
                    )
                    .positional(1),
                ),
            |m: Round| {
                let rounded = match m.direction {
                    Direction::Up => m.value.ceil(),
                    Direction::Down => m.value.floor(),
                    Direction::Nearest => m.value.round(),
                };
                println!("= {rounded}");
            },
        )?
        .with_bare("quit", "leave the calculator", move || done.set(true))
}

fn main() -> io::Result<()> {
    let done = Rc::new(Cell::new(false));
    let mut registry = match build_registry(Rc::clone(&done)) {
        Ok(registry) => registry,
        Err(defect) => {
            eprintln!("defective command declaration: {defect}");
            std::process::exit(2);
        }
    };

    println!("calc: {} commands, 'quit' to leave", registry.len());
    let stdin = io::stdin();
    loop {
        print!("calc> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Err(err) = registry.parse_line(line) {
            println!("error: {err}");
        }
        if done.get() {
            break;
        }
    }
    Ok(())
}
