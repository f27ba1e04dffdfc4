//! Error types for the drover engine.
//!
//! Failures fall into two unrelated families. [`SchemaError`] reports a
//! defective command declaration and surfaces once, at registration
//! time; a schema that validated never raises it again. [`BindingError`]
//! reports a defective input line and surfaces on every dispatch; the
//! host prints it and reads the next line. The tokenizer has its own
//! [`LexError`] so it stays usable on its own, converted into
//! [`BindingError`] at the dispatch boundary.

use thiserror::Error;

use crate::lexer::TokenKind;
use crate::schema::FieldKind;

/// Convenience type alias for Results using [`BindingError`].
pub type Result<T, E = BindingError> = std::result::Result<T, E>;

/// A command declaration the binder could never satisfy.
///
/// Returned by [`ModelSchema::validate`](crate::schema::ModelSchema::validate)
/// and by registration. These are defects in the embedding application,
/// not in user input, so the registry rejects the whole command up front
/// instead of failing lines one at a time.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SchemaError {
    /// A value field was declared over a Rust type the binder cannot
    /// produce from any token.
    #[error("field {field}: cannot bind values of type {type_name}")]
    UnsupportedType {
        /// Field whose setter was rejected.
        field: &'static str,
        /// The offending Rust type, as `std::any::type_name` reports it.
        type_name: &'static str,
    },

    /// A field was declared with neither a position nor aliases.
    #[error("field {field}: declared without a position or aliases")]
    MissingBinding {
        /// The unbindable field.
        field: &'static str,
    },

    /// The positional orders do not form the exact sequence `0, 1, ..`.
    #[error("positional orders must count up from zero without gaps: {orders:?}")]
    NonContiguousOrders {
        /// Every declared order, sorted ascending, duplicates kept.
        orders: Vec<usize>,
    },

    /// The same alias is claimed by more than one named field.
    #[error("duplicate aliases: {}", .aliases.join(", "))]
    DuplicateAliases {
        /// Each alias that appeared more than once, in declaration order.
        aliases: Vec<&'static str>,
    },

    /// An enumeration field with no members can never bind a value.
    #[error("field {field}: enumeration has no members")]
    EmptyEnum {
        /// The memberless field.
        field: &'static str,
    },

    /// The same member name appears twice in an enumeration table; the
    /// first occurrence would always shadow the rest.
    #[error("field {field}: duplicate enumeration members: {}", .members.join(", "))]
    DuplicateEnumMembers {
        /// The field with the defective member table.
        field: &'static str,
        /// Each member name that appeared more than once, in table order.
        members: Vec<&'static str>,
    },

    /// A command name was registered twice.
    #[error("command {name:?} is already registered")]
    DuplicateCommand {
        /// The contested name.
        name: String,
    },
}

/// Errors from tokenizing a raw input line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LexError {
    /// A `"` opened a string that never closed before end of line.
    #[error("unterminated string starting at byte {at}")]
    UnterminatedString {
        /// Byte offset of the opening quote in the line.
        at: usize,
    },

    /// A `-` or `--` marker with no name attached to it.
    #[error("dangling marker at byte {at}: expected a name after the dash")]
    DanglingMarker {
        /// Byte offset of the first dash in the line.
        at: usize,
    },
}

/// A line that could not be dispatched or bound.
///
/// Everything here is recoverable: the model under construction is
/// discarded, nothing was invoked, and the next line starts clean.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BindingError {
    /// The line failed to tokenize.
    #[error("malformed line: {0}")]
    Lex(#[from] LexError),

    /// The first token of a line must be a bare command word.
    #[error("expected a command word, found {found}")]
    CommandNotLiteral {
        /// What the first token actually was.
        found: TokenKind,
    },

    /// No command registered under this name.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A parameterless command was given arguments.
    #[error("command {command:?} takes no arguments")]
    UnexpectedArguments {
        /// The invoked command.
        command: String,
    },

    /// A token of the wrong shape was offered to a field.
    #[error("field {field}: expected {expected}, got {found}")]
    TypeMismatch {
        /// Field being bound.
        field: &'static str,
        /// Value kind the field accepts.
        expected: FieldKind,
        /// Token kind that was offered.
        found: TokenKind,
    },

    /// A literal did not name any member of an enumeration field.
    #[error("field {field}: {value:?} is not one of: {}", .allowed.join(", "))]
    InvalidEnumValue {
        /// Field being bound.
        field: &'static str,
        /// The rejected literal.
        value: String,
        /// Member names the field accepts.
        allowed: Vec<&'static str>,
    },

    /// A number token did not fit the field's numeric kind.
    #[error("field {field}: cannot read {value:?} as {kind}")]
    NumberFormat {
        /// Field being bound.
        field: &'static str,
        /// Numeric kind the field wanted.
        kind: FieldKind,
        /// The unparseable token text.
        value: String,
    },

    /// The line ended while positional slots were still unfilled.
    #[error("missing argument [{index}] ({field}: {expected})")]
    MissingPositional {
        /// Zero-based position of the unfilled slot.
        index: usize,
        /// Field that owns the slot.
        field: &'static str,
        /// Value kind the slot wanted.
        expected: FieldKind,
    },

    /// A flag or key appeared where a positional value was due.
    #[error("argument [{index}] must be a value, found {found}")]
    MarkerInPositional {
        /// Zero-based position of the slot being filled.
        index: usize,
        /// The marker kind that appeared instead.
        found: TokenKind,
    },

    /// A flag or key named no field of the command.
    #[error("unknown flag or key: {alias}")]
    UnknownAlias {
        /// The unrecognized name, without its dashes.
        alias: String,
    },

    /// A bare value appeared in the named region with no key before it.
    #[error("stray {found} {value:?}: values here must follow a key")]
    ValueWithoutKey {
        /// Kind of the stray token.
        found: TokenKind,
        /// Its text.
        value: String,
    },

    /// The line ended right after a key.
    #[error("key {key:?} expects a value")]
    MissingKeyValue {
        /// The dangling key, without its dashes.
        key: String,
    },

    /// Another flag or key appeared where a key's value was due.
    #[error("key {key:?} must be followed by a value, found {found}")]
    MarkerAfterKey {
        /// The key awaiting a value.
        key: String,
        /// The marker kind that appeared instead.
        found: TokenKind,
    },

    /// A field registered as required was never supplied.
    #[error("missing required field {field} (give it as: {})", .aliases.join(", "))]
    MissingRequiredField {
        /// The unsupplied field.
        field: &'static str,
        /// Aliases the caller could have used.
        aliases: Vec<&'static str>,
    },
}
