//! Binding supplied values onto caller state
//!
//! After a successful parse, [`bind`] walks the supplied arguments in
//! definition order and hands each `(field, value)` pair to a
//! [`ValueSink`]. The field is the argument's long name without its `--`
//! prefix; a no value flag binds the empty string. The parser never
//! learns the binding strategy: callers implement the trait on their own
//! configuration type, or collect into the provided [`MapSink`].
//!
//! # Examples
//!
//! ```
//! use argrule::{bind, ArgParser, MapSink};
//!
//! let mut parser = ArgParser::new();
//! parser.define_lines(&["-i,--inputFile,true", "-v,--verbose,false"])?;
//! parser.parse(&["-i", "data.csv", "-v"])?;
//!
//! let mut sink = MapSink::new();
//! bind(&parser, &mut sink)?;
//!
//! assert_eq!(sink.get("inputFile"), Some("data.csv"));
//! assert_eq!(sink.get("verbose"), Some(""));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::HashMap;

use thiserror::Error;

use crate::parser::{ArgParser, ParseError};

/// Errors a sink raises for a field and value pair it cannot take
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Field '{field}' not defined")]
    UnknownField { field: String },

    #[error("Field '{field}' rejected value '{value}'")]
    Rejected { field: String, value: String },
}

/// Errors raised while binding parsed values onto a sink
#[derive(Debug, Error)]
pub enum BindError {
    #[error("Binding field '{field}' failed: {source}")]
    Sink { field: String, source: SinkError },

    #[error("{0}")]
    Parse(#[from] ParseError),
}

/// A destination for supplied argument values
pub trait ValueSink {
    /// Take one bound field; reject it with a [`SinkError`]
    fn apply(&mut self, field: &str, value: &str) -> Result<(), SinkError>;
}

/// Feed every supplied argument to the sink, in definition order
///
/// Stops at the sink's first rejection. Fails with the parser's
/// not-yet-parsed error when no command line has been parsed.
pub fn bind<S>(parser: &ArgParser, sink: &mut S) -> Result<(), BindError>
where
    S: ValueSink + ?Sized,
{
    for (field, value) in parser.supplied_values()? {
        sink.apply(field, value).map_err(|source| BindError::Sink {
            field: field.to_string(),
            source,
        })?;
    }

    Ok(())
}

/// A map backed sink for callers without a configuration type to fill
#[derive(Debug, Default)]
pub struct MapSink {
    values: HashMap<String, String>,
}

impl MapSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bound value for a field, `Some("")` for a bound flag
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Give up the collected map
    pub fn into_values(self) -> HashMap<String, String> {
        self.values
    }
}

impl ValueSink for MapSink {
    fn apply(&mut self, field: &str, value: &str) -> Result<(), SinkError> {
        self.values.insert(field.to_string(), value.to_string());
        Ok(())
    }
}
