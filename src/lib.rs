//! Terminal demo clients for a Redis-protocol data store.
//!
//! Every demo keeps its whole simulation inside the store as a Lua script
//! that is evaluated atomically once per tick. This library only connects,
//! sends the script with its arguments, decodes the reply and draws it.
//!
//! See [`tick`] for the loop that ties the pieces together and [`demos`] for
//! the three shipped demos.

#![warn(missing_docs)]

pub mod braille;
pub mod command;
pub mod config;
pub mod demos;
pub mod engine;
pub mod error;
pub mod frame;
pub mod input;
pub mod render;
pub mod tick;

pub use error::{Error, Result};
