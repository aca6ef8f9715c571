//! Declarative chart descriptions and the builders that produce them.

pub mod builders;
pub mod spec;
