//! Text rendering of session state. Pure: no terminal access.

pub mod frame;
pub mod screens;

pub use frame::{Frame, Line, Span, Tone};
pub use screens::{View, render};
