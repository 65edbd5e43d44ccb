//! Arithmetic consistency between a column and an expression over other
//! columns.

use dq_common::Dataset;
use dq_model::Comparison;

use crate::error::{EvalError, Result};
use crate::outcome::Finding;

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Number(f64),
    Column(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Sub),
            "*" => Some(Operator::Mul),
            "/" => Some(Operator::Div),
            _ => None,
        }
    }

    fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            Operator::Add => left + right,
            Operator::Sub => left - right,
            Operator::Mul => left * right,
            Operator::Div => left / right,
        }
    }
}

/// Infix expression evaluated strictly left to right.
#[derive(Debug, Clone, PartialEq)]
struct Expression {
    first: Operand,
    rest: Vec<(Operator, Operand)>,
}

impl Expression {
    fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason: &str| EvalError::InvalidExpression {
            expression: raw.to_string(),
            reason: reason.to_string(),
        };
        let mut tokens = raw.split_whitespace();
        let first = tokens
            .next()
            .map(operand)
            .ok_or_else(|| invalid("empty expression"))?;
        let mut rest = Vec::new();
        while let Some(token) = tokens.next() {
            let operator =
                Operator::parse(token).ok_or_else(|| invalid(&format!("expected operator, found `{token}`")))?;
            let right = tokens
                .next()
                .map(operand)
                .ok_or_else(|| invalid("dangling operator"))?;
            rest.push((operator, right));
        }
        Ok(Self { first, rest })
    }

    fn columns(&self) -> impl Iterator<Item = &str> {
        std::iter::once(&self.first)
            .chain(self.rest.iter().map(|(_, operand)| operand))
            .filter_map(|operand| match operand {
                Operand::Column(name) => Some(name.as_str()),
                Operand::Number(_) => None,
            })
    }
}

fn operand(token: &str) -> Operand {
    match token.parse::<f64>() {
        Ok(value) => Operand::Number(value),
        Err(_) => Operand::Column(token.to_string()),
    }
}

/// Compare `field` against an expression, row by row.
///
/// With `==` a row fails when the relative error `|1 - field / result|`
/// exceeds `tolerance`. Any other operator flags rows where
/// `field <op> result` holds. Nulls, unparsable values and non-finite
/// results fail.
pub fn evaluate(
    dataset: &Dataset,
    field: &str,
    operator: Comparison,
    operand: &str,
    tolerance: f64,
) -> Result<Finding> {
    let expression = Expression::parse(operand)?;
    let values = dataset.numbers(field)?;
    let columns = expression
        .columns()
        .map(|name| Ok((name.to_string(), dataset.numbers(name)?)))
        .collect::<Result<std::collections::HashMap<_, _>>>()?;

    let resolve = |operand: &Operand, idx: usize| match operand {
        Operand::Number(value) => Some(*value),
        Operand::Column(name) => columns.get(name).and_then(|values| values[idx]),
    };

    let failed = values
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            let result = resolve(&expression.first, idx).and_then(|first| {
                expression.rest.iter().try_fold(first, |acc, (op, right)| {
                    Some(op.apply(acc, resolve(right, idx)?))
                })
            });
            let (Some(value), Some(result)) = (*value, result) else {
                return true;
            };
            if !result.is_finite() {
                return true;
            }
            match operator {
                Comparison::Eq if result == 0.0 => value != 0.0,
                Comparison::Eq => (1.0 - value / result).abs() > tolerance,
                op => op.holds(value, result),
            }
        })
        .collect();
    Ok(Finding::full(failed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::frame;

    fn invoice() -> Dataset {
        frame(&[
            ("total", [Some("110"), Some("100"), Some("0"), None]),
            ("net", [Some("100"), Some("100"), Some("0"), Some("5")]),
            ("tax", [Some("10"), Some("10"), Some("0"), Some("1")]),
        ])
    }

    #[test]
    fn equality_uses_relative_tolerance() {
        let finding = evaluate(&invoice(), "total", Comparison::Eq, "net + tax", 0.0).unwrap();
        assert_eq!(finding.failed, vec![false, true, false, true]);

        let finding = evaluate(&invoice(), "total", Comparison::Eq, "net + tax", 0.1).unwrap();
        assert_eq!(finding.failed, vec![false, false, false, true]);
    }

    #[test]
    fn evaluates_left_to_right() {
        // (net + tax) * 1 / 2, not net + (tax * 1 / 2)
        let dataset = frame(&[
            ("half", [Some("55")]),
            ("net", [Some("100")]),
            ("tax", [Some("10")]),
        ]);
        let finding = evaluate(&dataset, "half", Comparison::Eq, "net + tax * 1 / 2", 0.0).unwrap();
        assert_eq!(finding.failed, vec![false]);
    }

    #[test]
    fn other_operators_flag_matching_rows() {
        let finding = evaluate(&invoice(), "total", Comparison::Gt, "net", 0.0).unwrap();
        assert_eq!(finding.failed, vec![true, false, false, true]);
    }

    #[test]
    fn malformed_expression_is_an_error() {
        let err = evaluate(&invoice(), "total", Comparison::Eq, "net +", 0.0).unwrap_err();
        assert!(matches!(err, EvalError::InvalidExpression { .. }));
        assert!(Expression::parse("net tax").is_err());
    }
}
