use compact_str::ToCompactString;
use lazy_regex::regex;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    combinator::{opt, value},
};

use super::{Constraint, ConstraintGroup, ConstraintSet, Operator};
use crate::{ParseError, error::span, version::parse_version};

/// Parse the full `a,b||c d` syntax into alternative groups.
pub(super) fn constraint_set(input: &str) -> Result<ConstraintSet, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    regex!(r"\|\|?")
        .split(input)
        .map(|branch| constraint_group(input, branch))
        .collect::<Result<Vec<_>, _>>()
        .map(ConstraintSet::from)
}

fn constraint_group(input: &str, branch: &str) -> Result<ConstraintGroup, ParseError> {
    let branch = branch.trim();
    if branch.is_empty() {
        return Err(malformed(input, branch, None));
    }

    regex!(r"\s*,\s*|\s+")
        .split(branch)
        .map(|token| constraint(input, token))
        .collect::<Result<Vec<_>, _>>()
        .map(ConstraintGroup::from)
}

fn constraint(input: &str, token: &str) -> Result<Constraint, ParseError> {
    let (rest, operator) = match opt(operator).parse(token) {
        Ok(parsed) => parsed,
        Err(_) => return Err(malformed(input, token, None)),
    };
    if rest.is_empty() {
        return Err(malformed(input, token, None));
    }

    let version = parse_version(rest).map_err(|err| malformed(input, token, Some(err)))?;
    Ok(Constraint {
        operator: operator.unwrap_or(Operator::Equal),
        version,
        original: token.to_compact_string(),
    })
}

/// Longer symbols come first so that `>=` is never read as `>` followed by `=`.
fn operator(input: &str) -> IResult<&str, Operator> {
    alt((
        value(Operator::Pessimistic, tag("~>")),
        value(Operator::NotEqual, tag("!=")),
        value(Operator::GreaterOrEqual, tag(">=")),
        value(Operator::LessOrEqual, tag("<=")),
        value(Operator::Equal, tag("=")),
        value(Operator::Greater, tag(">")),
        value(Operator::Less, tag("<")),
        value(Operator::Caret, tag("^")),
        value(Operator::Tilde, tag("~")),
    ))
    .parse(input)
}

fn malformed(input: &str, token: &str, error: Option<ParseError>) -> ParseError {
    ParseError::Constraint {
        input: input.to_string(),
        token: token.to_string(),
        error: error.map(Box::new),
        span: span(input, token),
    }
}
