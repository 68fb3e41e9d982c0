//! Hierarchical clinical skill-mix taxonomies
//!
//! Layers, innermost first:
//! - [`domain`]: dimension model, depth-aware queries, builder and combinator (no I/O)
//! - [`application`]: catalog, build and scenario services
//! - [`infrastructure`]: filesystem boundary and service wiring
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
