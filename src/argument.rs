//! Argument definitions and per-argument structural validation
//!
//! An argument is described by a short name (`-a`), a long name
//! (`--action`), a flag for whether it consumes a value, an optional
//! enumeration of legal values, and a mandatory flag. Definitions are
//! written either through [`SpecBuilder`] or as a comma separated
//! definition line:
//!
//! ```text
//! short name,long name,has value[,value enumeration][,mandatory]
//! ```
//!
//! for example
//!
//! ```text
//! -a,--action,true,create|update|delete,true
//! -t,--type,true,CLOB|BLOB
//! -v,--verbose,false
//! -i,--input,true,,true
//! ```

use std::fmt;

use thiserror::Error;

/// Errors raised while defining an argument
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Argument short name format error: {name}")]
    ShortNameFormat { name: String },

    #[error("Argument long name format error: {name}")]
    LongNameFormat { name: String },

    #[error("Argument definition '{line}' must have 3 to 5 comma separated fields")]
    FieldCount { line: String },

    #[error("Illegal boolean value '{token}' in argument definition '{line}'")]
    IllegalBoolean { token: String, line: String },

    #[error("Argument '{short},{long}' has been defined already")]
    Duplicate { short: String, long: String },
}

/// Structural validation errors intrinsic to a single argument
#[derive(Debug, Error)]
pub enum StructuralError {
    #[error("Argument '{name}' is a no value argument but was set a value: {value}")]
    UnexpectedValue { name: String, value: String },

    #[error("Argument '{name}' is a mandatory argument but has not been supplied")]
    MandatoryMissing { name: String },

    #[error("Argument '{name}' value '{value}' is not permitted, it can be: {allowed}")]
    ValueNotPermitted {
        name: String,
        value: String,
        allowed: String,
    },
}

/// The value slot of an argument
///
/// A no value argument seen on the command line holds [`ArgValue::Present`];
/// a value argument holds the token that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// Not seen on the command line
    Absent,
    /// Seen on the command line, no value attached
    Present,
    /// Seen on the command line with a value
    Text(String),
}

impl ArgValue {
    /// True when the argument was seen on the command line at all
    pub fn is_supplied(&self) -> bool {
        !matches!(self, ArgValue::Absent)
    }

    /// The supplied text: an empty string for a bare flag, `None` when absent
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Absent => None,
            ArgValue::Present => Some(""),
            ArgValue::Text(text) => Some(text),
        }
    }
}

/// Definition of one command line argument plus its value slot
///
/// The definition half (names, arity, enumeration, mandatory flag) is
/// immutable after construction; only the value slot changes, and only
/// while a parse pass is running.
#[derive(Debug, Clone)]
pub struct ArgSpec {
    short_name: String,
    long_name: String,
    takes_value: bool,
    allowed_values: Vec<String>,
    mandatory: bool,
    value: ArgValue,
}

impl ArgSpec {
    /// Create a definition, checking both name formats
    pub fn new(
        short_name: &str,
        long_name: &str,
        takes_value: bool,
        allowed_values: Vec<String>,
        mandatory: bool,
    ) -> Result<Self, DefinitionError> {
        if !short_name.starts_with('-') || short_name.starts_with("--") {
            return Err(DefinitionError::ShortNameFormat {
                name: short_name.to_string(),
            });
        }

        if !long_name.starts_with("--") {
            return Err(DefinitionError::LongNameFormat {
                name: long_name.to_string(),
            });
        }

        Ok(Self {
            short_name: short_name.to_string(),
            long_name: long_name.to_string(),
            takes_value,
            allowed_values,
            mandatory,
            value: ArgValue::Absent,
        })
    }

    /// Start building a definition fluently
    pub fn builder() -> SpecBuilder {
        SpecBuilder::default()
    }

    /// Parse a comma separated definition line
    ///
    /// The line must have 3 to 5 fields: short name, long name, a has-value
    /// boolean, then optionally a pipe delimited value enumeration and a
    /// mandatory boolean. Names and boolean tokens are trimmed; an empty
    /// enumeration field means the value is unconstrained.
    ///
    /// # Examples
    ///
    /// ```
    /// use argrule::ArgSpec;
    ///
    /// let spec = ArgSpec::from_line("-a,--action,true,create|update|delete,true").unwrap();
    /// assert_eq!(spec.short_name(), "-a");
    /// assert_eq!(spec.long_name(), "--action");
    /// assert!(spec.takes_value());
    /// assert!(spec.mandatory());
    /// ```
    pub fn from_line(line: &str) -> Result<Self, DefinitionError> {
        let fields: Vec<&str> = line.split(',').collect();

        if fields.len() < 3 || fields.len() > 5 {
            return Err(DefinitionError::FieldCount {
                line: line.to_string(),
            });
        }

        let allowed_values = if fields.len() > 3 {
            parse_allowed_values(fields[3])
        } else {
            Vec::new()
        };

        let mandatory = if fields.len() == 5 {
            parse_bool(fields[4], line)?
        } else {
            false
        };

        Self::new(
            fields[0].trim(),
            fields[1].trim(),
            parse_bool(fields[2], line)?,
            allowed_values,
            mandatory,
        )
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn long_name(&self) -> &str {
        &self.long_name
    }

    /// Both names joined for diagnostics, e.g `-a|--action`
    pub fn name(&self) -> String {
        format!("{}|{}", self.short_name, self.long_name)
    }

    /// The long name without its leading dashes, used as a binding field name
    pub fn field_name(&self) -> &str {
        self.long_name.trim_start_matches('-')
    }

    pub fn takes_value(&self) -> bool {
        self.takes_value
    }

    pub fn mandatory(&self) -> bool {
        self.mandatory
    }

    /// The legal values, empty when the value is unconstrained
    pub fn allowed_values(&self) -> &[String] {
        &self.allowed_values
    }

    /// The current value slot
    pub fn value(&self) -> &ArgValue {
        &self.value
    }

    /// The supplied text, `Some("")` for a bare flag, `None` when absent
    pub fn value_str(&self) -> Option<&str> {
        self.value.as_str()
    }

    /// True when the argument was seen on the command line
    pub fn is_supplied(&self) -> bool {
        self.value.is_supplied()
    }

    /// Assign the value slot, enforcing the no-value arity rule
    ///
    /// A no value argument only ever carries the presence marker; giving
    /// it text is a structural error.
    pub(crate) fn set_value(&mut self, value: ArgValue) -> Result<(), StructuralError> {
        if !self.takes_value {
            if let ArgValue::Text(text) = &value {
                if !text.is_empty() {
                    return Err(StructuralError::UnexpectedValue {
                        name: self.name(),
                        value: text.clone(),
                    });
                }
            }
        }

        self.value = value;
        Ok(())
    }

    pub(crate) fn clear_value(&mut self) {
        self.value = ArgValue::Absent;
    }

    /// Per-argument checks run once per parse over every registered spec
    ///
    /// Fails when a mandatory argument is absent, or when an enumerated
    /// argument was supplied a value outside its enumeration. The
    /// enumeration message lists the legal values pipe joined.
    pub fn structural_validate(&self) -> Result<(), StructuralError> {
        if self.mandatory && !self.is_supplied() {
            return Err(StructuralError::MandatoryMissing { name: self.name() });
        }

        if !self.allowed_values.is_empty() {
            if let Some(value) = self.value.as_str() {
                if !self.allowed_values.iter().any(|allowed| allowed == value) {
                    return Err(StructuralError::ValueNotPermitted {
                        name: self.name(),
                        value: value.to_string(),
                        allowed: self.allowed_values.join("|"),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Renders the definition line form: `short,long,hasValue,enumeration`
///
/// The mandatory flag is not part of the rendering; re-parsing the output
/// yields a spec with the same names, arity and enumeration.
impl fmt::Display for ArgSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.short_name,
            self.long_name,
            self.takes_value,
            self.allowed_values.join("|")
        )
    }
}

/// Consuming builder for [`ArgSpec`]
///
/// Setter methods take the builder by value, so once [`build`](Self::build)
/// has run there is no builder left to mutate.
///
/// # Examples
///
/// ```
/// use argrule::ArgSpec;
///
/// let spec = ArgSpec::builder()
///     .short_name("-a")
///     .long_name("--action")
///     .takes_value(true)
///     .allowed_value("create")
///     .allowed_value("delete")
///     .mandatory(true)
///     .build()
///     .unwrap();
/// assert_eq!(spec.allowed_values(), ["create", "delete"]);
/// ```
#[derive(Debug, Default)]
pub struct SpecBuilder {
    short_name: String,
    long_name: String,
    takes_value: bool,
    allowed_values: Vec<String>,
    mandatory: bool,
}

impl SpecBuilder {
    /// Set the short name, e.g `-a`
    pub fn short_name(mut self, name: &str) -> Self {
        self.short_name = name.to_string();
        self
    }

    /// Set the long name, e.g `--action`
    pub fn long_name(mut self, name: &str) -> Self {
        self.long_name = name.to_string();
        self
    }

    /// Whether the argument consumes the following token as its value
    pub fn takes_value(mut self, takes_value: bool) -> Self {
        self.takes_value = takes_value;
        self
    }

    /// Whether the argument must be supplied
    pub fn mandatory(mut self, mandatory: bool) -> Self {
        self.mandatory = mandatory;
        self
    }

    /// Add one legal value to the enumeration, ignoring duplicates
    pub fn allowed_value(mut self, value: &str) -> Self {
        if !self.allowed_values.iter().any(|existing| existing == value) {
            self.allowed_values.push(value.to_string());
        }
        self
    }

    /// Add several legal values to the enumeration
    pub fn allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            let value = value.into();
            if !self.allowed_values.iter().any(|existing| existing == &value) {
                self.allowed_values.push(value);
            }
        }
        self
    }

    /// Finalise the definition, checking both name formats
    pub fn build(self) -> Result<ArgSpec, DefinitionError> {
        ArgSpec::new(
            &self.short_name,
            &self.long_name,
            self.takes_value,
            self.allowed_values,
            self.mandatory,
        )
    }
}

/// Break a camel case identifier into space separated lowercase words,
/// e.g `inputFile` to `input file`
pub(crate) fn camel_to_words(identifier: &str) -> String {
    let mut words = String::with_capacity(identifier.len());

    for ch in identifier.chars() {
        if ch.is_uppercase() {
            words.push(' ');
            for lower in ch.to_lowercase() {
                words.push(lower);
            }
        } else {
            words.push(ch);
        }
    }

    words
}

const BOOL_TRUE: [&str; 5] = ["Y", "YES", "TRUE", "1", "T"];
const BOOL_FALSE: [&str; 5] = ["N", "NO", "FALSE", "0", "F"];

/// Recognise boolean tokens Y/N, YES/NO, TRUE/FALSE, 1/0, T/F
fn parse_bool(token: &str, line: &str) -> Result<bool, DefinitionError> {
    let upper = token.trim().to_uppercase();

    if BOOL_TRUE.contains(&upper.as_str()) {
        return Ok(true);
    }
    if BOOL_FALSE.contains(&upper.as_str()) {
        return Ok(false);
    }

    Err(DefinitionError::IllegalBoolean {
        token: token.to_string(),
        line: line.to_string(),
    })
}

/// Parse the pipe delimited enumeration field, trimming each member
fn parse_allowed_values(field: &str) -> Vec<String> {
    let mut members: Vec<String> = Vec::new();

    for member in field.split('|') {
        let member = member.trim();
        if !member.is_empty() && !members.iter().any(|existing| existing == member) {
            members.push(member.to_string());
        }
    }

    members
}
