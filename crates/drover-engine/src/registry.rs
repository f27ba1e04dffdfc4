//! Command registration and line dispatch.
//!
//! A [`Registry`] maps command names to validated schemas and handlers.
//! Registration is where [`SchemaError`]s surface; a command that made
//! it into the registry binds lines forever after. Dispatch reads the
//! command word off a line, hands the rest of the tokens to the
//! command's binder, and invokes the handler with the populated model.
//!
//! Handlers are `FnMut` closures owned by the registry. Each one closes
//! over its own compiled [`BindingContext`], so dispatch does no
//! downcasting and no lookup beyond the command name itself.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::binder::bind;
use crate::error::{BindingError, SchemaError};
use crate::lexer::{TokenKind, TokenStream};
use crate::schema::ModelSchema;

/// Help text substituted for commands registered without any.
const NO_HELP: &str = "no help text provided";

/// A registered command: its help line and its type-erased invoker.
struct CommandEntry {
    help: &'static str,
    invoke: Invoke,
}

/// The two invocation shapes a command can have.
enum Invoke {
    /// Binds a model from the remaining tokens, then runs the handler.
    Model(Box<dyn FnMut(&mut TokenStream<'_>) -> Result<(), BindingError>>),
    /// Takes nothing; the line must end after the command word.
    Bare(Box<dyn FnMut()>),
}

/// The command table for one interpreter.
///
/// Built up front with [`with_command`](Registry::with_command) and
/// [`with_bare`](Registry::with_bare), then driven one line at a time
/// with [`parse_line`](Registry::parse_line). Lookup is case-sensitive.
#[derive(Default)]
pub struct Registry {
    commands: HashMap<&'static str, CommandEntry>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Registry {
            commands: HashMap::new(),
        }
    }

    /// Register a command whose arguments bind into a model `M`.
    ///
    /// `schema` is validated here; a defective declaration fails with
    /// the [`SchemaError`] before anything is stored. `handler` runs
    /// once per successfully bound line. An empty `help` gets a stock
    /// placeholder.
    pub fn with_command<M: Default + 'static>(
        mut self,
        name: &'static str,
        help: &'static str,
        schema: ModelSchema<M>,
        mut handler: impl FnMut(M) + 'static,
    ) -> Result<Self, SchemaError> {
        let context = schema.validate()?;
        let invoke = move |tokens: &mut TokenStream<'_>| -> Result<(), BindingError> {
            let model = bind(tokens, &context)?;
            handler(model);
            Ok(())
        };
        self.insert(name, help, Invoke::Model(Box::new(invoke)))?;
        Ok(self)
    }

    /// Register a command that takes no arguments at all.
    ///
    /// Dispatch enforces that the line ends right after the command
    /// word; anything else is
    /// [`BindingError::UnexpectedArguments`].
    pub fn with_bare(
        mut self,
        name: &'static str,
        help: &'static str,
        handler: impl FnMut() + 'static,
    ) -> Result<Self, SchemaError> {
        self.insert(name, help, Invoke::Bare(Box::new(handler)))?;
        Ok(self)
    }

    fn insert(
        &mut self,
        name: &'static str,
        help: &'static str,
        invoke: Invoke,
    ) -> Result<(), SchemaError> {
        let help = if help.is_empty() { NO_HELP } else { help };
        match self.commands.entry(name) {
            Entry::Occupied(_) => Err(SchemaError::DuplicateCommand {
                name: name.to_owned(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(CommandEntry { help, invoke });
                Ok(())
            }
        }
    }

    /// Interpret one line: resolve the command, bind, invoke.
    ///
    /// The first token must be a bare word naming a registered command.
    /// On any error nothing is invoked and the registry is unchanged;
    /// the caller reports the error and carries on with the next line.
    pub fn parse_line(&mut self, line: &str) -> Result<(), BindingError> {
        let mut tokens = TokenStream::new(line)?;
        let first = tokens.current();
        if first.kind != TokenKind::Literal {
            return Err(BindingError::CommandNotLiteral { found: first.kind });
        }
        let entry = self
            .commands
            .get_mut(first.text)
            .ok_or_else(|| BindingError::UnknownCommand(first.text.to_owned()))?;
        tokens.advance()?;

        match &mut entry.invoke {
            Invoke::Model(run) => run(&mut tokens),
            Invoke::Bare(run) => {
                if tokens.current().kind != TokenKind::Eof {
                    return Err(BindingError::UnexpectedArguments {
                        command: first.text.to_owned(),
                    });
                }
                run();
                Ok(())
            }
        }
    }

    /// Every registered command with its help line, sorted by name.
    pub fn commands(&self) -> Vec<(&'static str, &'static str)> {
        let mut listing: Vec<_> = self
            .commands
            .iter()
            .map(|(name, entry)| (*name, entry.help))
            .collect();
        listing.sort_by_key(|(name, _)| *name);
        listing
    }

    /// The help line registered under `name` (case-sensitive).
    pub fn help(&self, name: &str) -> Option<&'static str> {
        self.commands.get(name).map(|entry| entry.help)
    }

    /// Whether a command is registered under `name` (case-sensitive).
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the registry has no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Handler closures have no useful rendering; show the names.
        let mut names: Vec<&str> = self.commands.keys().copied().collect();
        names.sort_unstable();
        f.debug_struct("Registry")
            .field("commands", &names)
            .finish_non_exhaustive()
    }
}
