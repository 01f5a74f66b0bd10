//! Declarative command line arguments with cross argument validation rules
//!
//! Arguments are defined from compact definition lines
//! (`short,long,hasValue[,enumValues][,mandatory]`) or a builder, parsed
//! from the raw token sequence in a single pass, then validated in two
//! stages: per argument structural checks (mandatory presence, enumerated
//! values), followed by cross argument rules written in a small textual
//! rule language, such as `-t dependsOn -a=update`, `-u conflictsWith -t`
//! or `-a isIn [insert,update,delete]`. Rules are resolved against the
//! defined arguments when added, and evaluated in that order after every
//! parse.
//!
//! # Examples
//!
//! ```
//! use argrule::ArgParser;
//!
//! let mut parser = ArgParser::new();
//! parser.define_lines(&[
//!     "-a,--action,true,insert|update|delete",
//!     "-t,--updateTag,true",
//! ])?;
//! parser.add_rule("-t dependsOn -a=update")?;
//!
//! parser.parse(&["-a", "update", "-t", "v2"])?;
//! assert_eq!(parser.value("--updateTag")?, Some("v2"));
//!
//! // a tag without an update action violates the rule
//! parser.reset();
//! let error = parser.parse(&["-a", "delete", "-t", "v2"]).unwrap_err();
//! assert_eq!(
//!     error.to_string(),
//!     "Argument -t depends on -a=update but delete"
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod argument;
pub mod help;
pub mod parser;
pub mod registry;
pub mod rules;
pub mod sink;

pub use argument::{ArgSpec, ArgValue, DefinitionError, SpecBuilder, StructuralError};
pub use help::{usage_line, HelpEntry};
pub use parser::{ArgParser, ParseError};
pub use registry::{ArgId, ArgRegistry};
pub use rules::{RuleDefinitionError, RuleOp, RuleViolation};
pub use sink::{bind, BindError, MapSink, SinkError, ValueSink};
