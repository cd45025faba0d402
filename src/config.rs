//! Configuration loader and schema types.
//!
//! `Settings` is the user-facing, layered configuration. `Layout` is the
//! resolved set of directories handed to every component at startup.

mod layout;
mod load;
mod schema;

pub use layout::*;
pub use load::resolve_config_path;
pub use schema::*;

#[cfg(test)]
mod tests;
