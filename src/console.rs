//! Output sink shared by command handlers and the REPL itself.
//!
//! Handlers never print directly; they speak through a [`Console`] so
//! tests can swap the real stdout for a capturing buffer and assert on
//! what a command said.

use std::cell::RefCell;
use std::rc::Rc;

/// Where user-facing lines go.
#[derive(Debug, Clone)]
pub enum Console {
    /// Write through to stdout.
    Stdout,
    /// Buffer everything for later inspection.
    Capture(Rc<RefCell<Vec<String>>>),
}

impl Console {
    /// A console that buffers instead of printing.
    pub fn capture() -> Self {
        Console::Capture(Rc::new(RefCell::new(Vec::new())))
    }

    /// Emit one line.
    pub fn say(&self, line: impl Into<String>) {
        match self {
            Console::Stdout => println!("{}", line.into()),
            Console::Capture(buffer) => buffer.borrow_mut().push(line.into()),
        }
    }

    /// Everything said so far. Empty for the stdout console, which
    /// keeps nothing.
    pub fn captured(&self) -> Vec<String> {
        match self {
            Console::Stdout => Vec::new(),
            Console::Capture(buffer) => buffer.borrow().clone(),
        }
    }
}
