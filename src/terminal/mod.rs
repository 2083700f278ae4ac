//! crossterm front-end: terminal guard, key routing, interactive loop.

pub mod guard;
pub mod input;
pub mod runtime;
