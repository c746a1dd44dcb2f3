#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` turns the command-line verbosity of `st-archive` and
//! `lt-archive` into a `tracing` subscriber. Library crates only emit events
//! through the `tracing` macros with `archive::*` targets; the binaries call
//! [`init_tracing`] once at startup.
//!
//! # Design
//!
//! [`VerbosityConfig`] maps the `-v` count onto a level (warn, info, debug,
//! trace). [`build_filter`] turns it into an `EnvFilter`, letting `RUST_LOG`
//! override it, and [`init_tracing`] installs a formatting subscriber on
//! standard error so listings printed to standard output stay clean.
//!
//! # Examples
//!
//! ```
//! use logging::{VerbosityConfig, build_filter};
//! use tracing::level_filters::LevelFilter;
//!
//! let filter = build_filter(VerbosityConfig::from_verbose_level(1), None);
//! assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
//! ```

mod config;
mod subscriber;

pub use config::VerbosityConfig;
pub use subscriber::{LOG_ENV, build_filter, init_tracing};
