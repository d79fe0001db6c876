//! CLI command implementations.

mod check;
mod fetch;

pub(crate) use check::check;
pub(crate) use fetch::fetch;
