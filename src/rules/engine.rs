//! Rule evaluation against parsed argument state
//!
//! Operators come in two modes. Value operators (`isIn`, `isInteger`,
//! `isNumber`, `lessThan`, `greaterThan`) inspect the left argument's
//! supplied value and are skipped entirely when it is absent; presence
//! operators (`dependsOn`, `conflictsWith`, `isMandatory`) inspect
//! whether arguments were supplied at all and always run. Evaluation is
//! read only, so rules can run any number of times between parses.

use crate::argument::ArgSpec;
use crate::registry::ArgRegistry;
use crate::rules::grammar::{Criteria, RightOperand, RuleExpr, RuleOp};

/// A cross argument rule that did not hold for the parsed command line
///
/// The rendered message names the rule the way it was written and what
/// was actually observed, for example
/// `Argument -q less than -m but 100.06 and 90`.
#[derive(Debug)]
pub struct RuleViolation {
    left: String,
    operator: String,
    right: Option<String>,
    observed: Option<String>,
}

impl std::fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Argument {} {}", self.left, self.operator)?;
        if let Some(right) = &self.right {
            write!(f, " {}", right)?;
        }
        if let Some(observed) = &self.observed {
            write!(f, " but {}", observed)?;
        }
        Ok(())
    }
}

impl std::error::Error for RuleViolation {}

/// Evaluate one rule against the registry's current values
pub(crate) fn evaluate(rule: &RuleExpr, registry: &ArgRegistry) -> Result<(), RuleViolation> {
    let left = registry.spec(rule.left());

    match rule.op() {
        RuleOp::IsMandatory => {
            if left.is_supplied() {
                Ok(())
            } else {
                Err(violation(rule, Some("not supplied".to_string())))
            }
        }
        RuleOp::DependsOn => depends_on(rule, left, registry),
        RuleOp::ConflictsWith => {
            let conflicted = match rule.right() {
                Some(RightOperand::ArgRef { id, .. }) => registry.spec(*id).is_supplied(),
                _ => false,
            };

            if left.is_supplied() && conflicted {
                Err(violation(rule, None))
            } else {
                Ok(())
            }
        }
        RuleOp::IsInteger => unary_value(rule, left, |value| value.parse::<i64>().is_ok()),
        RuleOp::IsNumber => unary_value(rule, left, |value| parse_decimal(value).is_some()),
        RuleOp::LessThan => comparison(rule, left, registry, |left, right| left < right),
        RuleOp::GreaterThan => comparison(rule, left, registry, |left, right| left > right),
        RuleOp::IsIn => is_in(rule, left),
    }
}

fn depends_on(
    rule: &RuleExpr,
    left: &ArgSpec,
    registry: &ArgRegistry,
) -> Result<(), RuleViolation> {
    if !left.is_supplied() {
        return Ok(());
    }

    let (referenced, criteria) = match rule.right() {
        Some(RightOperand::ArgRef { id, criteria, .. }) => (registry.spec(*id), criteria.as_ref()),
        // the grammar only builds dependsOn against an argument reference
        _ => return Ok(()),
    };

    match criteria {
        None => {
            if referenced.is_supplied() {
                Ok(())
            } else {
                Err(violation(rule, None))
            }
        }
        Some(criteria) => {
            let holds = referenced
                .value_str()
                .map_or(false, |value| criteria_holds(criteria, value));

            if holds {
                Ok(())
            } else {
                let observed = referenced.value_str().unwrap_or("not supplied").to_string();
                Err(violation(rule, Some(observed)))
            }
        }
    }
}

fn criteria_holds(criteria: &Criteria, value: &str) -> bool {
    match criteria {
        Criteria::Equals(expected) => expected == value,
        Criteria::GreaterThan(bound) => {
            decimal_pair(value, bound).map_or(false, |(value, bound)| value > bound)
        }
        Criteria::LessThan(bound) => {
            decimal_pair(value, bound).map_or(false, |(value, bound)| value < bound)
        }
    }
}

fn unary_value(
    rule: &RuleExpr,
    left: &ArgSpec,
    accept: impl Fn(&str) -> bool,
) -> Result<(), RuleViolation> {
    match left.value_str() {
        Some(value) if !accept(value) => Err(violation(rule, Some(value.to_string()))),
        _ => Ok(()),
    }
}

fn comparison(
    rule: &RuleExpr,
    left: &ArgSpec,
    registry: &ArgRegistry,
    holds: impl Fn(f64, f64) -> bool,
) -> Result<(), RuleViolation> {
    let left_value = match left.value_str() {
        Some(value) => value,
        None => return Ok(()),
    };

    let (right_value, observed) = match rule.right() {
        Some(RightOperand::ArgRef { id, .. }) => {
            let referenced = registry.spec(*id);
            let observed = format!(
                "{} and {}",
                left_value,
                referenced.value_str().unwrap_or("not supplied")
            );
            (referenced.value_str().map(str::to_string), observed)
        }
        Some(RightOperand::Constant(text)) => (Some(text.clone()), left_value.to_string()),
        _ => return Ok(()),
    };

    // the left value is parsed first, so a malformed left number fails
    // the rule even when the referenced argument is absent
    let left_number = match parse_decimal(left_value) {
        Some(number) => number,
        None => return Err(violation(rule, Some(observed))),
    };

    let passes = match right_value {
        // an unsupplied referenced argument leaves nothing to compare
        None => true,
        Some(text) => match parse_decimal(&text) {
            Some(right_number) => holds(left_number, right_number),
            None => false,
        },
    };

    if passes {
        Ok(())
    } else {
        Err(violation(rule, Some(observed)))
    }
}

fn is_in(rule: &RuleExpr, left: &ArgSpec) -> Result<(), RuleViolation> {
    let value = match left.value_str() {
        Some(value) => value,
        None => return Ok(()),
    };

    let accepted = match rule.right() {
        Some(RightOperand::Set { members, .. }) => members.iter().any(|member| member == value),
        _ => true,
    };

    if accepted {
        Ok(())
    } else {
        Err(violation(rule, Some(value.to_string())))
    }
}

fn violation(rule: &RuleExpr, observed: Option<String>) -> RuleViolation {
    RuleViolation {
        left: rule.left_name().to_string(),
        operator: rule.op().words(),
        right: render_right(rule.right()),
        observed,
    }
}

/// Render the right operand the way the rule wrote it
fn render_right(right: Option<&RightOperand>) -> Option<String> {
    right.map(|operand| match operand {
        RightOperand::Constant(text) => text.clone(),
        RightOperand::Set { raw, .. } => raw.clone(),
        RightOperand::ArgRef { name, criteria, .. } => match criteria {
            Some(criteria) => format!("{}{}", name, criteria),
            None => name.clone(),
        },
    })
}

/// Decimal parsing for comparisons; surrounding whitespace is tolerated
fn parse_decimal(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

fn decimal_pair(left: &str, right: &str) -> Option<(f64, f64)> {
    Some((parse_decimal(left)?, parse_decimal(right)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::{ArgSpec, ArgValue};

    fn registry() -> ArgRegistry {
        let mut registry = ArgRegistry::new();
        for line in [
            "-v,--verbose,false",
            "-a,--action,true",
            "-s,--startTag,true",
            "-S,--keepStartTag,false",
            "-q,--quantity,true",
            "-m,--maxQuantity,true",
            "-u,--update,false",
            "-t,--truncate,false",
        ] {
            registry.register(ArgSpec::from_line(line).unwrap()).unwrap();
        }
        registry
    }

    fn supply(registry: &mut ArgRegistry, name: &str, value: &str) {
        let id = registry.lookup(name).unwrap();
        let value = if value.is_empty() {
            ArgValue::Present
        } else {
            ArgValue::Text(value.to_string())
        };
        registry.spec_mut(id).set_value(value).unwrap();
    }

    fn check(rule: &str, registry: &ArgRegistry) -> Result<(), RuleViolation> {
        evaluate(&RuleExpr::parse(rule, registry).unwrap(), registry)
    }

    #[test]
    fn test_is_mandatory() {
        let mut registry = self::registry();

        let error = check("-v isMandatory", &registry).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Argument -v is mandatory but not supplied"
        );

        supply(&mut registry, "-v", "");
        assert!(check("-v isMandatory", &registry).is_ok());
    }

    #[test]
    fn test_is_integer() {
        let mut registry = self::registry();
        supply(&mut registry, "-q", "nextYear");

        let error = check("-q isInteger", &registry).unwrap_err();
        assert_eq!(error.to_string(), "Argument -q is integer but nextYear");

        let mut registry = self::registry();
        supply(&mut registry, "-q", "2000");
        assert!(check("-q isInteger", &registry).is_ok());
    }

    #[test]
    fn test_is_integer_does_not_trim() {
        let mut registry = self::registry();
        supply(&mut registry, "-q", " 2000 ");

        assert!(check("-q isInteger", &registry).is_err());
    }

    #[test]
    fn test_is_number_trims() {
        let mut registry = self::registry();
        supply(&mut registry, "-q", " 99.5 ");

        assert!(check("-q isNumber", &registry).is_ok());

        supply(&mut registry, "-m", "ninety");
        assert!(check("-m isNumber", &registry).is_err());
    }

    #[test]
    fn test_value_rules_skip_unsupplied_argument() {
        let registry = self::registry();

        assert!(check("-q isInteger", &registry).is_ok());
        assert!(check("-q isNumber", &registry).is_ok());
        assert!(check("-q lessThan 100.05", &registry).is_ok());
        assert!(check("-a isIn [insert,update,delete]", &registry).is_ok());
    }

    #[test]
    fn test_less_than_constant() {
        let mut registry = self::registry();
        supply(&mut registry, "-q", "100.06");

        let error = check("-q lessThan 100.05", &registry).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Argument -q less than 100.05 but 100.06"
        );

        let mut registry = self::registry();
        supply(&mut registry, "-q", "99.78");
        assert!(check("-q lessThan 100.05", &registry).is_ok());
    }

    #[test]
    fn test_less_than_reference() {
        let mut registry = self::registry();
        supply(&mut registry, "-q", "100.06");
        supply(&mut registry, "-m", "90");

        let error = check("-q lessThan -m", &registry).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Argument -q less than -m but 100.06 and 90"
        );

        let mut registry = self::registry();
        supply(&mut registry, "-q", "99.78");
        supply(&mut registry, "-m", "100");
        assert!(check("-q lessThan -m", &registry).is_ok());
    }

    #[test]
    fn test_comparison_against_unsupplied_reference_passes() {
        let mut registry = self::registry();
        supply(&mut registry, "-q", "100.06");

        assert!(check("-q lessThan -m", &registry).is_ok());
        assert!(check("-q greaterThan -m", &registry).is_ok());
    }

    #[test]
    fn test_comparison_malformed_left_fails_even_without_reference_value() {
        let mut registry = self::registry();
        supply(&mut registry, "-q", "lots");

        let error = check("-q lessThan -m", &registry).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Argument -q less than -m but lots and not supplied"
        );
    }

    #[test]
    fn test_greater_than() {
        let mut registry = self::registry();
        supply(&mut registry, "-q", "13");

        assert!(check("-q greaterThan 12", &registry).is_ok());

        let error = check("-q greaterThan 14", &registry).unwrap_err();
        assert_eq!(error.to_string(), "Argument -q greater than 14 but 13");
    }

    #[test]
    fn test_depends_on() {
        let mut registry = self::registry();
        supply(&mut registry, "-S", "");

        let error = check("-S dependsOn -s", &registry).unwrap_err();
        assert_eq!(error.to_string(), "Argument -S depends on -s");

        supply(&mut registry, "-s", "<TIME>");
        assert!(check("-S dependsOn -s", &registry).is_ok());
    }

    #[test]
    fn test_depends_on_passes_when_left_unsupplied() {
        let registry = self::registry();

        assert!(check("-S dependsOn -s", &registry).is_ok());
        assert!(check("-S dependsOn -s=<TIME>", &registry).is_ok());
    }

    #[test]
    fn test_depends_on_equals_criteria() {
        let mut registry = self::registry();
        supply(&mut registry, "-S", "");
        supply(&mut registry, "-s", "<TIME>");

        assert!(check("-S dependsOn -s=<TIME>", &registry).is_ok());

        let mut registry = self::registry();
        supply(&mut registry, "-S", "");
        supply(&mut registry, "-s", "<DATE>");

        let error = check("-S dependsOn -s=<TIME>", &registry).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Argument -S depends on -s=<TIME> but <DATE>"
        );
    }

    #[test]
    fn test_depends_on_criteria_with_unsupplied_reference() {
        let mut registry = self::registry();
        supply(&mut registry, "-S", "");

        let error = check("-S dependsOn -s=<TIME>", &registry).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Argument -S depends on -s=<TIME> but not supplied"
        );
    }

    #[test]
    fn test_depends_on_numeric_criteria() {
        let mut registry = self::registry();
        supply(&mut registry, "-S", "");
        supply(&mut registry, "-s", "13");

        assert!(check("-S dependsOn -s>12", &registry).is_ok());

        let error = check("-S dependsOn -s<12", &registry).unwrap_err();
        assert_eq!(error.to_string(), "Argument -S depends on -s<12 but 13");

        let mut registry = self::registry();
        supply(&mut registry, "-S", "");
        supply(&mut registry, "-s", "6");

        assert!(check("-S dependsOn -s<12", &registry).is_ok());
        assert!(check("-S dependsOn -s>12", &registry).is_err());
    }

    #[test]
    fn test_depends_on_numeric_criteria_with_malformed_value() {
        let mut registry = self::registry();
        supply(&mut registry, "-S", "");
        supply(&mut registry, "-s", "noon");

        let error = check("-S dependsOn -s>12", &registry).unwrap_err();
        assert_eq!(error.to_string(), "Argument -S depends on -s>12 but noon");
    }

    #[test]
    fn test_conflicts_with() {
        let mut registry = self::registry();
        supply(&mut registry, "-u", "");
        supply(&mut registry, "-t", "");

        let error = check("-u conflictsWith -t", &registry).unwrap_err();
        assert_eq!(error.to_string(), "Argument -u conflicts with -t");

        let mut registry = self::registry();
        supply(&mut registry, "-u", "");
        assert!(check("-u conflictsWith -t", &registry).is_ok());

        let mut registry = self::registry();
        supply(&mut registry, "-t", "");
        assert!(check("-u conflictsWith -t", &registry).is_ok());
    }

    #[test]
    fn test_is_in() {
        let mut registry = self::registry();
        supply(&mut registry, "-a", "update");

        assert!(check("-a isIn [insert,update,delete]", &registry).is_ok());

        let mut registry = self::registry();
        supply(&mut registry, "-a", "bulkdelete");

        let error = check("-a isIn [insert,update,delete]", &registry).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Argument -a is in [insert,update,delete] but bulkdelete"
        );
    }

    #[test]
    fn test_is_in_members_are_exact() {
        let mut registry = self::registry();
        supply(&mut registry, "-a", "UPDATE");

        assert!(check("-a isIn [insert,update,delete]", &registry).is_err());
    }

    #[test]
    fn test_flag_value_is_empty_for_value_rules() {
        // a supplied flag carries an empty value, which no number accepts
        let mut registry = self::registry();
        supply(&mut registry, "-v", "");

        let error = check("-v isInteger", &registry).unwrap_err();
        assert_eq!(error.to_string(), "Argument -v is integer but ");
    }
}
