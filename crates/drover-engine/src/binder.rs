//! The token-to-model binder.
//!
//! [`bind`] walks one token stream against a compiled
//! [`BindingContext`] and populates a fresh model. The walk has a fixed
//! shape: defaults first, then every positional slot in order, then the
//! named region until end of line, then the required-field sweep. Any
//! error abandons the model; nothing partial escapes.

use crate::error::BindingError;
use crate::lexer::{Token, TokenKind, TokenStream};
use crate::schema::{BindingContext, FieldKind, Slot};

/// Bind the remaining tokens of `tokens` into a fresh `M`.
///
/// The stream should be positioned past the command word; the binder
/// consumes everything up to end of line. Flag-bound `bool` fields are
/// forced to `false` before binding starts, so flag absence means
/// `false` even when `M::default()` says otherwise.
pub fn bind<M: Default>(
    tokens: &mut TokenStream<'_>,
    context: &BindingContext<M>,
) -> Result<M, BindingError> {
    let mut model = M::default();

    for slot in context.slots() {
        if let Slot::Bool(set) = slot {
            set(&mut model, false);
        }
    }

    bind_positional(tokens, context, &mut model)?;
    let bound = bind_named(tokens, context, &mut model)?;

    for (index, field) in context.named.iter().enumerate() {
        if field.required && !bound[index] {
            return Err(BindingError::MissingRequiredField {
                field: field.name,
                aliases: field.aliases.clone(),
            });
        }
    }

    Ok(model)
}

/// Fill every positional slot, in order, from the next tokens.
fn bind_positional<M>(
    tokens: &mut TokenStream<'_>,
    context: &BindingContext<M>,
    model: &mut M,
) -> Result<(), BindingError> {
    for (index, positional) in context.positional.iter().enumerate() {
        let token = tokens.current();
        match token.kind {
            TokenKind::Literal | TokenKind::String | TokenKind::Number => {
                assign(model, &positional.slot, positional.name, token)?;
            }
            TokenKind::Flag | TokenKind::Key => {
                return Err(BindingError::MarkerInPositional {
                    index,
                    found: token.kind,
                });
            }
            TokenKind::Eof => {
                return Err(BindingError::MissingPositional {
                    index,
                    field: positional.name,
                    expected: positional.slot.kind(),
                });
            }
        }
        tokens.advance()?;
    }
    Ok(())
}

/// Consume the named region until end of line.
///
/// Returns which named slots were bound, for the required-field sweep.
fn bind_named<M>(
    tokens: &mut TokenStream<'_>,
    context: &BindingContext<M>,
    model: &mut M,
) -> Result<Vec<bool>, BindingError> {
    let mut bound = vec![false; context.named.len()];

    loop {
        let token = tokens.current();
        match token.kind {
            TokenKind::Eof => break,

            TokenKind::Flag => {
                let index = context.lookup(token.text).ok_or_else(|| {
                    BindingError::UnknownAlias {
                        alias: token.text.to_owned(),
                    }
                })?;
                let field = &context.named[index];
                match &field.slot {
                    Slot::Bool(set) => set(model, true),
                    other => {
                        return Err(BindingError::TypeMismatch {
                            field: field.name,
                            expected: other.kind(),
                            found: TokenKind::Flag,
                        });
                    }
                }
                bound[index] = true;
            }

            TokenKind::Key => {
                let key = token.text;
                let index =
                    context
                        .lookup(key)
                        .ok_or_else(|| BindingError::UnknownAlias {
                            alias: key.to_owned(),
                        })?;
                tokens.advance()?;
                let value = tokens.current();
                match value.kind {
                    TokenKind::Literal | TokenKind::String | TokenKind::Number => {
                        let field = &context.named[index];
                        assign(model, &field.slot, field.name, value)?;
                        bound[index] = true;
                    }
                    TokenKind::Flag | TokenKind::Key => {
                        return Err(BindingError::MarkerAfterKey {
                            key: key.to_owned(),
                            found: value.kind,
                        });
                    }
                    TokenKind::Eof => {
                        return Err(BindingError::MissingKeyValue {
                            key: key.to_owned(),
                        });
                    }
                }
            }

            TokenKind::Literal | TokenKind::String | TokenKind::Number => {
                return Err(BindingError::ValueWithoutKey {
                    found: token.kind,
                    value: token.text.to_owned(),
                });
            }
        }
        tokens.advance()?;
    }

    Ok(bound)
}

/// Coerce one value token into one slot.
///
/// The accepted pairings are exactly: enum slots take bare words whose
/// text names a member, string slots take quoted strings, and numeric
/// slots take number tokens that parse into their width. Every other
/// pairing is a type mismatch.
fn assign<M>(
    model: &mut M,
    slot: &Slot<M>,
    field: &'static str,
    token: Token<'_>,
) -> Result<(), BindingError> {
    match (slot, token.kind) {
        (Slot::Enum { names, set }, TokenKind::Literal) => {
            match names.iter().position(|name| *name == token.text) {
                Some(index) => {
                    set(model, index);
                    Ok(())
                }
                None => Err(BindingError::InvalidEnumValue {
                    field,
                    value: token.text.to_owned(),
                    allowed: names.clone(),
                }),
            }
        }
        (Slot::Str(set), TokenKind::String) => {
            set(model, token.text.to_owned());
            Ok(())
        }
        (Slot::Double(set), TokenKind::Number) => {
            set(model, parse_number(field, FieldKind::Double, token.text)?);
            Ok(())
        }
        (Slot::Float(set), TokenKind::Number) => {
            set(model, parse_number(field, FieldKind::Float, token.text)?);
            Ok(())
        }
        (Slot::Long(set), TokenKind::Number) => {
            set(model, parse_number(field, FieldKind::Long, token.text)?);
            Ok(())
        }
        (Slot::Int(set), TokenKind::Number) => {
            set(model, parse_number(field, FieldKind::Int, token.text)?);
            Ok(())
        }
        (slot, found) => Err(BindingError::TypeMismatch {
            field,
            expected: slot.kind(),
            found,
        }),
    }
}

/// Parse a number token's text into the slot's width, or report which
/// field and kind refused it.
fn parse_number<N: std::str::FromStr>(
    field: &'static str,
    kind: FieldKind,
    text: &str,
) -> Result<N, BindingError> {
    text.parse().map_err(|_| BindingError::NumberFormat {
        field,
        kind,
        value: text.to_owned(),
    })
}
