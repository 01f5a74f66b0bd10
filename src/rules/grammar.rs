//! Rule parsing and definition-time resolution
//!
//! Rule text is split on single spaces: two elements make a unary rule,
//! three a binary one. The second operand of a binary rule is either a
//! reference to another defined argument (optionally narrowed by a
//! `=value`, `>value` or `<value` criteria suffix), a constant, or, for
//! `isIn`, a set literal. All argument references resolve against the
//! registry here, so an unresolved name can never surface mid-validation.

use thiserror::Error;

use crate::argument::camel_to_words;
use crate::registry::{ArgId, ArgRegistry};

/// Errors raised while defining a rule
#[derive(Debug, Error)]
pub enum RuleDefinitionError {
    #[error("Rule definition error: '{rule}' must have 2 or 3 space separated elements")]
    ElementCount { rule: String },

    #[error("Unknown rule operator '{operator}' in rule '{rule}'")]
    UnknownOperator { operator: String, rule: String },

    #[error("Rule operator '{operator}' expects {expected} operand(s) but rule '{rule}' has {actual}")]
    ArityMismatch {
        operator: String,
        expected: usize,
        actual: usize,
        rule: String,
    },

    #[error("Rule '{rule}' refers to argument '{name}' which has not been defined")]
    UnresolvedArgument { name: String, rule: String },

    #[error("isIn format error: {literal}")]
    MalformedSet { literal: String },

    #[error("Rule operator '{operator}' does not accept a value criteria, found '{operand}'")]
    UnexpectedCriteria { operator: String, operand: String },

    #[error("Rule operator '{operator}' requires an argument reference, found '{operand}'")]
    OperandNotArgument { operator: String, operand: String },
}

/// The closed set of rule operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOp {
    DependsOn,
    ConflictsWith,
    IsIn,
    IsInteger,
    IsNumber,
    LessThan,
    GreaterThan,
    IsMandatory,
}

impl RuleOp {
    /// Parse an operator token, case sensitive
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "dependsOn" => Some(RuleOp::DependsOn),
            "conflictsWith" => Some(RuleOp::ConflictsWith),
            "isIn" => Some(RuleOp::IsIn),
            "isInteger" => Some(RuleOp::IsInteger),
            "isNumber" => Some(RuleOp::IsNumber),
            "lessThan" => Some(RuleOp::LessThan),
            "greaterThan" => Some(RuleOp::GreaterThan),
            "isMandatory" => Some(RuleOp::IsMandatory),
            _ => None,
        }
    }

    /// The operator identifier as written in rule text
    pub fn name(&self) -> &'static str {
        match self {
            RuleOp::DependsOn => "dependsOn",
            RuleOp::ConflictsWith => "conflictsWith",
            RuleOp::IsIn => "isIn",
            RuleOp::IsInteger => "isInteger",
            RuleOp::IsNumber => "isNumber",
            RuleOp::LessThan => "lessThan",
            RuleOp::GreaterThan => "greaterThan",
            RuleOp::IsMandatory => "isMandatory",
        }
    }

    /// The operator rendered as space separated words for messages
    pub fn words(&self) -> String {
        camel_to_words(self.name())
    }

    /// True for operators that take a right operand
    pub fn is_binary(&self) -> bool {
        !matches!(
            self,
            RuleOp::IsInteger | RuleOp::IsNumber | RuleOp::IsMandatory
        )
    }

    /// True for operators that check the supplied value rather than presence
    ///
    /// Value operators skip entirely when the left argument is absent;
    /// presence operators always run.
    pub fn validates_value(&self) -> bool {
        matches!(
            self,
            RuleOp::IsIn
                | RuleOp::IsInteger
                | RuleOp::IsNumber
                | RuleOp::LessThan
                | RuleOp::GreaterThan
        )
    }
}

/// Value criteria narrowing a `dependsOn` argument reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criteria {
    /// `=V`: the referenced argument's value must equal V exactly
    Equals(String),
    /// `>V`: the value, parsed as a decimal, must be greater than V
    GreaterThan(String),
    /// `<V`: the value, parsed as a decimal, must be less than V
    LessThan(String),
}

impl std::fmt::Display for Criteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Criteria::Equals(value) => write!(f, "={}", value),
            Criteria::GreaterThan(value) => write!(f, ">{}", value),
            Criteria::LessThan(value) => write!(f, "<{}", value),
        }
    }
}

/// The right hand side of a binary rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RightOperand {
    /// A constant value, kept as written
    Constant(String),
    /// A reference to another defined argument, with optional criteria
    ArgRef {
        id: ArgId,
        name: String,
        criteria: Option<Criteria>,
    },
    /// A set literal for `isIn`, parsed eagerly at definition time
    Set { raw: String, members: Vec<String> },
}

/// One parsed cross argument rule
///
/// Immutable once parsed; holds resolved handles for every argument it
/// references, so evaluation never looks names up again.
#[derive(Debug, Clone)]
pub struct RuleExpr {
    op: RuleOp,
    left: ArgId,
    left_name: String,
    right: Option<RightOperand>,
}

impl RuleExpr {
    /// Parse a rule line and resolve its argument references
    pub fn parse(rule: &str, registry: &ArgRegistry) -> Result<Self, RuleDefinitionError> {
        let elements: Vec<&str> = rule.split(' ').collect();

        if elements.len() != 2 && elements.len() != 3 {
            return Err(RuleDefinitionError::ElementCount {
                rule: rule.to_string(),
            });
        }

        let left_name = elements[0].trim();
        let op_token = elements[1].trim();

        let op = RuleOp::from_token(op_token).ok_or_else(|| RuleDefinitionError::UnknownOperator {
            operator: op_token.to_string(),
            rule: rule.to_string(),
        })?;

        let supplied_operands = elements.len() - 1;
        let expected_operands = if op.is_binary() { 2 } else { 1 };
        if supplied_operands != expected_operands {
            return Err(RuleDefinitionError::ArityMismatch {
                operator: op.name().to_string(),
                expected: expected_operands,
                actual: supplied_operands,
                rule: rule.to_string(),
            });
        }

        let left = resolve(left_name, rule, registry)?;

        let right = if op.is_binary() {
            Some(parse_right_operand(op, elements[2].trim(), rule, registry)?)
        } else {
            None
        };

        Ok(Self {
            op,
            left,
            left_name: left_name.to_string(),
            right,
        })
    }

    pub fn op(&self) -> RuleOp {
        self.op
    }

    /// The left argument's name as written in the rule
    pub fn left_name(&self) -> &str {
        &self.left_name
    }

    pub(crate) fn left(&self) -> ArgId {
        self.left
    }

    pub fn right(&self) -> Option<&RightOperand> {
        self.right.as_ref()
    }
}

fn resolve(name: &str, rule: &str, registry: &ArgRegistry) -> Result<ArgId, RuleDefinitionError> {
    registry
        .lookup(name)
        .ok_or_else(|| RuleDefinitionError::UnresolvedArgument {
            name: name.to_string(),
            rule: rule.to_string(),
        })
}

fn parse_right_operand(
    op: RuleOp,
    operand: &str,
    rule: &str,
    registry: &ArgRegistry,
) -> Result<RightOperand, RuleDefinitionError> {
    if op == RuleOp::IsIn {
        return Ok(RightOperand::Set {
            raw: operand.to_string(),
            members: parse_set_literal(operand)?,
        });
    }

    if !is_argument_reference(operand) {
        if op.validates_value() {
            return Ok(RightOperand::Constant(operand.to_string()));
        }
        // dependsOn and conflictsWith relate two arguments
        return Err(RuleDefinitionError::OperandNotArgument {
            operator: op.name().to_string(),
            operand: operand.to_string(),
        });
    }

    let (name, criteria) = split_criteria(operand);
    if criteria.is_some() && op != RuleOp::DependsOn {
        return Err(RuleDefinitionError::UnexpectedCriteria {
            operator: op.name().to_string(),
            operand: operand.to_string(),
        });
    }

    let id = resolve(name, rule, registry)?;

    Ok(RightOperand::ArgRef {
        id,
        name: name.to_string(),
        criteria,
    })
}

/// A right operand names an argument iff it looks like a flag rather than
/// a negative number: leading dash, more than one character, second
/// character not a digit. `-1` and `-3.14` stay constants.
fn is_argument_reference(operand: &str) -> bool {
    let mut chars = operand.chars();

    chars.next() == Some('-')
        && chars
            .next()
            .map_or(false, |second| !second.is_ascii_digit())
}

/// Split an argument reference from its optional criteria suffix
///
/// Separators are probed in the priority order `=`, `>`, `<`; the first
/// separator character present anywhere in the operand ends the probe,
/// and is only accepted past position zero. `-s>12` splits into `-s`
/// and `>12`; a plain `-s` stays whole.
fn split_criteria(operand: &str) -> (&str, Option<Criteria>) {
    for separator in ['=', '>', '<'] {
        if let Some(pos) = operand.find(separator) {
            if pos == 0 {
                return (operand, None);
            }

            let name = &operand[..pos];
            let value = operand[pos + 1..].to_string();
            let criteria = match separator {
                '=' => Criteria::Equals(value),
                '>' => Criteria::GreaterThan(value),
                _ => Criteria::LessThan(value),
            };

            return (name, Some(criteria));
        }
    }

    (operand, None)
}

const SET_QUOTES: [(char, char); 5] = [
    ('(', ')'),
    ('[', ']'),
    ('{', '}'),
    ('\'', '\''),
    ('"', '"'),
];

/// Parse an `isIn` set literal
///
/// Supported forms: `(v1,v2)`, `[v1,v2]`, `{v1,v2}`, `'v1,v2'`,
/// `"v1,v2"` and bare `v1,v2`. Members are delimited by `,` or `|` and
/// trimmed. An opening quote without its matching closer is a
/// definition error.
fn parse_set_literal(literal: &str) -> Result<Vec<String>, RuleDefinitionError> {
    let mut text = literal.trim();

    for (open, close) in SET_QUOTES {
        if text.is_empty() {
            break;
        }
        if text.starts_with(open) {
            if text.len() < 2 || !text.ends_with(close) {
                return Err(RuleDefinitionError::MalformedSet {
                    literal: text.to_string(),
                });
            }
            text = &text[open.len_utf8()..text.len() - close.len_utf8()];
        }
    }

    let mut members: Vec<String> = text
        .split(|c| c == ',' || c == '|')
        .map(|member| member.trim().to_string())
        .collect();

    while members.last().map_or(false, |member| member.is_empty()) {
        members.pop();
    }

    Ok(members)
}
