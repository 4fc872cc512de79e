// Axis option language parser module

pub mod ast;
pub mod command;
pub mod lexer;
pub mod pipeline;

// Public API re-exports
pub use ast::AxisCommand;
pub use pipeline::{apply_commands, parse_axis_spec};
