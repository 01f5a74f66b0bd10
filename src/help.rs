//! Usage line rendering
//!
//! Formatting lives here, away from the parser: the renderer consumes
//! per argument [`HelpEntry`] views in definition order and assembles a
//! one line usage summary. Enumerated arguments show their legal values,
//! free value arguments get a readable placeholder derived from the long
//! name, and mandatory entries are starred.

use crate::argument::{camel_to_words, ArgSpec};

/// The per argument view consumed by the usage renderer
pub struct HelpEntry<'a> {
    pub short_name: &'a str,
    pub long_name: &'a str,
    pub takes_value: bool,
    pub allowed_values: &'a [String],
    pub mandatory: bool,
}

impl<'a> From<&'a ArgSpec> for HelpEntry<'a> {
    fn from(spec: &'a ArgSpec) -> Self {
        Self {
            short_name: spec.short_name(),
            long_name: spec.long_name(),
            takes_value: spec.takes_value(),
            allowed_values: spec.allowed_values(),
            mandatory: spec.mandatory(),
        }
    }
}

impl HelpEntry<'_> {
    /// Render one entry, e.g. `-a|--action [create|update|delete]`
    pub fn render(&self) -> String {
        let mut entry = format!("{}|{}", self.short_name, self.long_name);

        if self.takes_value {
            entry.push(' ');
            if self.allowed_values.is_empty() {
                entry.push_str(&self.placeholder());
            } else {
                entry.push('[');
                entry.push_str(&self.allowed_values.join("|"));
                entry.push(']');
            }
        }

        if self.mandatory {
            entry.push_str(" *");
        }

        entry
    }

    /// A reader friendly value placeholder derived from the long name
    ///
    /// The long name loses its dashes and its camelCase words come apart
    /// lowercased; a name ending in `File` gains a trailing ` name`, so
    /// `--inputFile` renders as `{input file name}`.
    fn placeholder(&self) -> String {
        let mut words = camel_to_words(self.long_name.trim_start_matches('-'));
        if self.long_name.ends_with("File") {
            words.push_str(" name");
        }

        format!("{{{}}}", words)
    }
}

/// Assemble the one line usage summary for a program
///
/// A `* mandatory argument` footnote follows on its own line when any
/// entry is starred.
pub fn usage_line<'a>(program: &str, entries: impl IntoIterator<Item = HelpEntry<'a>>) -> String {
    let mut line = format!("Usage: {}", program);
    let mut any_mandatory = false;

    for entry in entries {
        any_mandatory = any_mandatory || entry.mandatory;
        line.push(' ');
        line.push_str(&entry.render());
    }

    if any_mandatory {
        line.push_str("\n* mandatory argument");
    }

    line
}
