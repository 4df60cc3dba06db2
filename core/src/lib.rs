//! Root of the `lsbmorph-core` library.
//!
//! Presentation-layer state for the LSB morphology classifier, kept free of
//! any UI toolkit: the form-sync layer around the shorthand codec
//! ([`form`]), contrast cycling and image-filename templating ([`display`]),
//! the responsive layout state machine ([`layout`]) and the layered
//! configuration ([`config`]).

// Prevent accidental direct writes to stdout/stderr in library code. All
// user-visible output must go through the CLI binary or the tracing stack.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod config;
pub mod display;
pub mod form;
pub mod layout;
