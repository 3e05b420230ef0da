//! Convenience wrapper for executing external commands, with `arch-chroot` support.
//!
//! Commands are plain values: they are built once, handed to an [`Executor`], and may be
//! logged without leaking secrets, since secret arguments and stdin payloads are never
//! rendered.

#[macro_use]
extern crate cascade;
#[macro_use]
extern crate log;

mod chroot;
mod command;
mod executor;

pub use self::{chroot::*, command::*, executor::*};
