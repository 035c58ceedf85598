//! Compilation passes.
//!
//! Only registration runs as a whole-program pass. Expression typing happens
//! lazily, per member, in [`crate::attribution`].

mod registration;

pub use registration::{RegistrationOutput, RegistrationPass};
