//! Command handlers

mod check;
mod run;

pub use check::CheckCommandHandler;
pub use run::RunCommandHandler;
