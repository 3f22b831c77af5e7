#![warn(missing_docs)]
//! # Structured logging for the field store
//!
//! The reducer emits `tracing` events for every applied intent and for every
//! diagnostic it produces (missing fields, missing groups, unrecognized intents).
//! This crate wires those events to a subscriber.
//!
//! ## Filtering
//! Filtering follows `RUST_LOG`:
//! ```bash
//! RUST_LOG=field_store=trace my_bin
//! ```
//! shows each intent as it is applied, while
//! ```bash
//! RUST_LOG=field_store=warn my_bin
//! ```
//! only shows the no-op diagnostics.
//!
//! A filter string can also be passed explicitly (for example from the
//! `tracing_override` key of the store config). It takes precedence over `RUST_LOG`.
//!
//! ## Output
//! The [Output] type selects the console format. It parses from a string so it
//! can come straight from a command line argument or an environment variable.

use derive_more::Display;
use std::str::FromStr;
use tracing_subscriber::{
    filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry,
};

pub use tracing;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
/// Sets the kind of structured logging output you want
pub enum Output {
    /// Regular logging (default)
    #[default]
    Log,
    /// More compact version of above
    Compact,
    /// Outputs everything as json
    Json,
    /// No logging to console
    None,
}

/// ParseError is a String
pub type ParseError = String;

impl FromStr for Output {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Log" => Ok(Output::Log),
            "Compact" => Ok(Output::Compact),
            "Json" => Ok(Output::Json),
            "None" => Ok(Output::None),
            _ => Err(format!("Could not parse log output type: {}", s)),
        }
    }
}

/// Run logging in a unit test.
///
/// RUST_LOG must be set or this is a no-op.
/// Calling it more than once in the same process returns an error,
/// which tests are free to ignore.
pub fn test_run() -> Result<(), errors::TracingError> {
    if std::env::var_os("RUST_LOG").is_none() {
        return Ok(());
    }

    init_fmt_with_opts(Output::Log, None, true)
}

/// Build the canonical filter.
///
/// An explicit override wins, then `RUST_LOG`, then `warn` as a default.
pub fn standard_filter(filter_override: Option<&str>) -> Result<EnvFilter, errors::TracingError> {
    if let Some(directives) = filter_override {
        return Ok(EnvFilter::try_new(directives)?);
    }
    match std::env::var("RUST_LOG") {
        Ok(_) => Ok(EnvFilter::from_default_env()),
        Err(_) => Ok(EnvFilter::default().add_directive("warn".parse()?)),
    }
}

/// Initialise the global subscriber, writing to stderr.
pub fn init_fmt(output: Output, filter_override: Option<&str>) -> Result<(), errors::TracingError> {
    init_fmt_with_opts(output, filter_override, false)
}

fn init_fmt_with_opts(
    output: Output,
    filter_override: Option<&str>,
    test_writer: bool,
) -> Result<(), errors::TracingError> {
    let filter = standard_filter(filter_override)?;

    match output {
        Output::Log if test_writer => Registry::default()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(filter),
            )
            .try_init()?,
        Output::Log => Registry::default()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_file(true)
                    .with_line_number(true)
                    .with_target(true)
                    .with_filter(filter),
            )
            .try_init()?,
        Output::Compact => Registry::default()
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_filter(filter),
            )
            .try_init()?,
        Output::Json => Registry::default()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr)
                    .with_filter(filter),
            )
            .try_init()?,
        Output::None => (),
    }
    Ok(())
}

pub mod errors {
    //! Error in the tracing/logging framework

    use thiserror::Error;

    /// Error in the tracing/logging framework
    #[allow(missing_docs)] // should be self-explanatory
    #[derive(Error, Debug)]
    pub enum TracingError {
        #[error(transparent)]
        TryInit(#[from] tracing_subscriber::util::TryInitError),
        #[error(transparent)]
        BadDirective(#[from] tracing_subscriber::filter::ParseError),
    }
}
