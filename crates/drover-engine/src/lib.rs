//! # drover-engine
//!
//! An embeddable interpreter core for line-oriented command consoles:
//! tokenize a line, validate a declared parameter schema once, then
//! bind tokens into plain Rust structs and invoke handlers.
//!
//! ## Features
//!
//! - Zero-copy tokenizing with a lazy single-lookahead cursor
//! - Declarative schemas: positional and named fields over setter closures
//! - One-time schema validation compiled into a reusable binding context
//! - Strict value coercion over a closed set of field kinds
//! - A command registry dispatching whole lines to `FnMut` handlers
//! - Two disjoint error families: declaration defects vs. bad input lines
//!
//! ## Quick Start
//!
//! ```rust
//! use drover_engine::{Field, ModelSchema, Registry};
//!
//! #[derive(Debug, Default)]
//! struct Move {
//!     target: String,
//!     speed: f64,
//!     fast: bool,
//! }
//!
//! let mut registry = Registry::new()
//!     .with_command(
//!         "move",
//!         "move toward a target",
//!         ModelSchema::new()
//!             .field(Field::value("target", |m: &mut Move, v: String| m.target = v).positional(0))
//!             .field(Field::value("speed", |m: &mut Move, v: f64| m.speed = v).named(&["speed", "s"]))
//!             .field(Field::value("fast", |m: &mut Move, v: bool| m.fast = v).named(&[])),
//!         |m: Move| println!("moving to {} at {} (fast: {})", m.target, m.speed, m.fast),
//!     )
//!     .expect("schema is sound");
//!
//! registry.parse_line(r#"move "north gate" --speed 12.5 -fast"#).expect("line binds");
//! ```
//!
//! Binding is strict on purpose: quoted strings go to string fields,
//! bare words to enumeration fields, numbers to numeric fields, and
//! flags to `bool` fields. `move north-gate` against the schema above
//! is a type error, not a convenience.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod binder;
pub mod error;
pub mod lexer;
pub mod registry;
pub mod schema;

pub use self::binder::bind;
pub use self::error::{BindingError, LexError, Result, SchemaError};
pub use self::lexer::{Token, TokenKind, TokenStream};
pub use self::registry::Registry;
pub use self::schema::{BindingContext, Field, FieldKind, ModelSchema};
