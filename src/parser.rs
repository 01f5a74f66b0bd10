//! Argument parsing and validation orchestration
//!
//! `ArgParser` ties the pieces together: arguments are defined up front
//! (from definition lines or built specs), cross argument rules are added
//! against the defined set, and `parse` consumes the raw token sequence in
//! a single left to right pass before running the validation sequence:
//! structural checks over every argument in definition order, then rules
//! in the order they were added. The first failure aborts the pass.
//!
//! # Examples
//!
//! ```
//! use argrule::ArgParser;
//!
//! let mut parser = ArgParser::new();
//! parser.define_lines(&[
//!     "-a,--action,true,create|update|delete",
//!     "-v,--verbose,false",
//! ])?;
//! parser.add_rule("-a isMandatory")?;
//!
//! parser.parse(&["-v", "-a", "create"])?;
//!
//! assert_eq!(parser.value("--action")?, Some("create"));
//! assert!(parser.is_supplied("-v")?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use log::debug;
use thiserror::Error;

use crate::argument::{ArgSpec, ArgValue, DefinitionError, StructuralError};
use crate::help::{usage_line, HelpEntry};
use crate::registry::ArgRegistry;
use crate::rules::{engine, RuleDefinitionError, RuleExpr, RuleViolation};

/// Errors raised while parsing a command line or querying its results
#[derive(Debug, Error)]
pub enum ParseError {
    /// A flag token that matches no defined argument
    #[error("Argument {name} can't be recognised")]
    UnrecognizedArgument { name: String },

    /// A bare token that no preceding flag consumed as its value
    #[error("Argument {token} can't be recognised")]
    UnrecognizedToken { token: String },

    #[error("Argument value not supplied for: {name}")]
    ValueNotSupplied { name: String },

    /// Values may never look like flags
    #[error("Wrong argument value '{value}' for: {name}")]
    WrongArgumentValue { name: String, value: String },

    #[error("Command line arguments have not been parsed")]
    NotYetParsed,

    #[error("Argument '{name}' not defined")]
    UndefinedArgument { name: String },

    #[error("{0}")]
    Structural(#[from] StructuralError),

    #[error("{0}")]
    Rule(#[from] RuleViolation),
}

/// Declarative command line parser with cross argument rule validation
pub struct ArgParser {
    registry: ArgRegistry,
    rules: Vec<RuleExpr>,
    has_parsed: bool,
}

impl ArgParser {
    pub fn new() -> Self {
        Self {
            registry: ArgRegistry::new(),
            rules: Vec::new(),
            has_parsed: false,
        }
    }

    /// Define an argument from its textual definition line
    pub fn define_line(&mut self, line: &str) -> Result<(), DefinitionError> {
        self.define(ArgSpec::from_line(line)?)
    }

    /// Define several arguments at once, stopping at the first bad line
    pub fn define_lines(&mut self, lines: &[&str]) -> Result<(), DefinitionError> {
        for line in lines {
            self.define_line(line)?;
        }
        Ok(())
    }

    /// Register a spec built elsewhere, via [`ArgSpec::builder`] for example
    pub fn define(&mut self, spec: ArgSpec) -> Result<(), DefinitionError> {
        debug!("Defining argument {}", spec.name());
        self.registry.register(spec)?;
        Ok(())
    }

    /// Add a cross argument rule, resolving its references immediately
    pub fn add_rule(&mut self, rule: &str) -> Result<(), RuleDefinitionError> {
        debug!("Adding rule '{}'", rule);
        let parsed = RuleExpr::parse(rule, &self.registry)?;
        self.rules.push(parsed);
        Ok(())
    }

    /// Add several rules at once, stopping at the first bad definition
    pub fn add_rules(&mut self, rules: &[&str]) -> Result<(), RuleDefinitionError> {
        for rule in rules {
            self.add_rule(rule)?;
        }
        Ok(())
    }

    /// Parse a command line and run the full validation sequence
    ///
    /// Values survive until the next `reset`, so a second parse layers on
    /// top of an earlier one unless `reset` is called in between.
    pub fn parse(&mut self, args: &[&str]) -> Result<(), ParseError> {
        self.has_parsed = true;
        debug!("Parsing {} command line token(s)", args.len());

        let mut index = 0;
        while index < args.len() {
            let token = args[index];
            index += 1;

            // an empty token carries nothing to parse
            if token.is_empty() {
                continue;
            }

            if !token.starts_with('-') {
                return Err(ParseError::UnrecognizedToken {
                    token: token.to_string(),
                });
            }

            let id = self.registry.lookup(token).ok_or_else(|| {
                ParseError::UnrecognizedArgument {
                    name: token.to_string(),
                }
            })?;

            if self.registry.spec(id).takes_value() {
                let value = match args.get(index) {
                    Some(value) => *value,
                    None => {
                        return Err(ParseError::ValueNotSupplied {
                            name: token.to_string(),
                        })
                    }
                };

                if value.starts_with('-') {
                    return Err(ParseError::WrongArgumentValue {
                        name: token.to_string(),
                        value: value.to_string(),
                    });
                }

                self.registry
                    .spec_mut(id)
                    .set_value(ArgValue::Text(value.to_string()))?;
                index += 1;
            } else {
                self.registry.spec_mut(id).set_value(ArgValue::Present)?;
            }
        }

        self.validate()
    }

    /// Structural checks in definition order, then rules in added order
    fn validate(&self) -> Result<(), ParseError> {
        for spec in self.registry.specs() {
            spec.structural_validate()?;
        }

        debug!("Evaluating {} validation rule(s)", self.rules.len());
        for rule in &self.rules {
            engine::evaluate(rule, &self.registry)?;
        }

        Ok(())
    }

    /// The supplied value of an argument, by short or long name
    ///
    /// `None` when the argument was not supplied; `Some("")` for a
    /// supplied no value flag.
    pub fn value(&self, name: &str) -> Result<Option<&str>, ParseError> {
        Ok(self.resolve(name)?.value_str())
    }

    /// Whether an argument was seen on the parsed command line
    pub fn is_supplied(&self, name: &str) -> Result<bool, ParseError> {
        Ok(self.resolve(name)?.is_supplied())
    }

    /// Supplied arguments as `(field, value)` pairs in definition order
    ///
    /// The field is the long name without its `--` prefix, the form value
    /// binding consumes.
    pub fn supplied_values(&self) -> Result<Vec<(&str, &str)>, ParseError> {
        if !self.has_parsed {
            return Err(ParseError::NotYetParsed);
        }

        Ok(self
            .registry
            .specs()
            .filter_map(|spec| spec.value_str().map(|value| (spec.field_name(), value)))
            .collect())
    }

    fn resolve(&self, name: &str) -> Result<&ArgSpec, ParseError> {
        if !self.has_parsed {
            return Err(ParseError::NotYetParsed);
        }

        let id = self
            .registry
            .lookup(name)
            .ok_or_else(|| ParseError::UndefinedArgument {
                name: name.to_string(),
            })?;

        Ok(self.registry.spec(id))
    }

    /// Clear every supplied value, keeping definitions and rules
    pub fn reset(&mut self) {
        debug!("Resetting supplied argument values");
        self.registry.reset_values();
    }

    /// Render the usage line for the defined arguments
    pub fn usage(&self, program: &str) -> String {
        usage_line(program, self.registry.specs().map(HelpEntry::from))
    }
}

impl Default for ArgParser {
    fn default() -> Self {
        Self::new()
    }
}
