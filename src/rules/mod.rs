//! The cross argument rule mini language
//!
//! A rule line reads `<arg1> <operator> [<arg2-or-constant>]`, with a
//! single space between elements:
//!
//! ```text
//! -S dependsOn -s
//! -S dependsOn -s=<TIME>
//! -S dependsOn -s>12
//! -u conflictsWith -t
//! -a isIn [insert,update,delete]
//! -y isInteger
//! -q lessThan -m
//! -q lessThan 100.05
//! -v isMandatory
//! ```
//!
//! [`grammar`] parses rule text and resolves argument references against
//! the registry at definition time; [`engine`] evaluates parsed rules
//! against the state of a finished token pass.

pub mod engine;
pub mod grammar;

pub use engine::RuleViolation;
pub use grammar::{Criteria, RightOperand, RuleDefinitionError, RuleExpr, RuleOp};
