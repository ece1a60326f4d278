use std::str::FromStr;

use assert_matches::assert_matches;
use impls::impls;
use itertools::Itertools;
use serde::{Serialize, de::DeserializeOwned};
use simple_test_case::test_case;
use static_assertions::const_assert;
use strum::IntoEnumIterator;

use shopware_version::*;

#[test]
fn trait_impls() {
    const_assert!(impls!(ConstraintSet: FromStr));
    const_assert!(impls!(ConstraintSet: TryFrom<&'static str>));
    const_assert!(impls!(ConstraintSet: TryFrom<String>));
    const_assert!(impls!(ConstraintSet: Send & Sync));
    const_assert!(impls!(ConstraintSet: Serialize & DeserializeOwned));
    const_assert!(impls!(ConstraintSet: utoipa::ToSchema));
    const_assert!(impls!(Constraint: Send & Sync));
    const_assert!(impls!(Operator: Copy & Send & Sync));
}

#[test_case(">=1.0.0"; "single")]
#[test_case(">=1.0.0 || <2.0.0"; "or")]
#[test_case(">=1.0.0,<2.0.0"; "and")]
#[test_case(">=1.0, <2.0"; "comma_and_space")]
#[test_case("^6.5 | ~6.4"; "single_pipe")]
#[test_case("  ~6.5.0  "; "surrounding_whitespace")]
#[test]
fn parses(input: &str) {
    assert_matches!(ConstraintSet::parse(input), Ok(_));
}

#[test_case(">=1.0 <2.0", ">=1.0,<2.0"; "whitespace_and")]
#[test_case("~6.4 >=6.4.20.0 || ~6.5", "~6.4,>=6.4.20.0||~6.5"; "whitespace_and_or")]
#[test_case("<6.6.1.0||>=6.3.5.0", "<6.6.1.0||>=6.3.5.0"; "no_whitespace")]
#[test_case("1.0.0", "1.0.0"; "bare_version")]
#[test_case(">=1.0 , <2.0 | ^3", ">=1.0,<2.0||^3"; "single_pipe")]
#[test_case("=v6.5+build", "=v6.5+build"; "keeps_token_text")]
#[test]
fn renders(input: &str, expected: &str) {
    let constraints = ConstraintSet::parse(input).expect("must parse");
    assert_eq!(constraints.to_string(), expected);
}

#[test]
fn equivalent_spellings() {
    let spaced = constraints!("~6.4 >=6.4.20.0 || ~6.5");
    let compact = constraints!("~6.4,>=6.4.20.0||~6.5");
    assert_eq!(spaced, compact);

    for version in ["6.4.0.0", "6.4.20", "6.4.20.0", "6.5.0", "6.5.0.0-rc1", "7.0"] {
        let version = version!(version);
        assert_eq!(spaced.check(&version), compact.check(&version), "{version}");
    }
}

#[test]
fn structure() {
    let constraints = constraints!("~6.4 >=6.4.20.0 || ~6.5");
    let groups = constraints.iter().collect_vec();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].iter().count(), 2);

    let operators = constraints.constraints().map(Constraint::operator).collect_vec();
    assert_eq!(
        operators,
        vec![Operator::Tilde, Operator::GreaterOrEqual, Operator::Tilde]
    );

    let first = constraints.constraints().next().expect("has constraints");
    assert_eq!(first.version(), &version!("6.4"));
    assert_eq!(first.as_str(), "~6.4");
    assert!(!first.is_prerelease());
}

#[test]
fn bare_version_is_equality() {
    let constraints = constraints!("1.0.0");
    assert_matches!(
        constraints.constraints().map(Constraint::operator).collect_vec().as_slice(),
        [Operator::Equal]
    );
    assert!(constraints.check(&version!("1.0.0")));
    assert!(constraints.check(&version!("1.0")));
    assert!(!constraints.check(&version!("1.0.1")));
}

#[test]
fn whitespace_and() {
    let constraints = constraints!(">=1.0 <2.0");
    assert!(constraints.check(&version!("1.0.0")));
    assert!(!constraints.check(&version!("2.0.0")));
}

#[test_case("6.4.20", true; "three_segments")]
#[test_case("6.4.20.0", true; "four_segments")]
#[test_case("6.5.0", true; "next_minor")]
#[test_case("6.4.0.0", false; "below_minimum")]
#[test]
fn whitespace_and_or(version: &str, expected: bool) {
    let constraints = constraints!("~6.4 >=6.4.20.0 || ~6.5");
    assert_eq!(constraints.check(&version!(version)), expected);
}

#[test]
fn either_branch() {
    let constraints = constraints!("<6.6.1.0||>=6.3.5.0");
    assert!(constraints.check(&version!("6.4.0.0")));
}

#[test_case("6.4.0.0", true; "same")]
#[test_case("6.4.5.0", true; "patch")]
#[test_case("6.9.9.9", true; "minor")]
#[test_case("6.3.0.0", false; "below")]
#[test_case("7.0.0.0", false; "next_major")]
#[test]
fn caret(version: &str, expected: bool) {
    assert_eq!(constraints!("^6.4.0").check(&version!(version)), expected);
}

#[test_case("~6.5.0"; "tilde")]
#[test_case("^6.5"; "caret")]
#[test_case("^6.5.0"; "caret_three_segments")]
#[test_case(">=6.5"; "greater_or_equal")]
#[test_case("~>6.5.0"; "pessimistic")]
#[test]
fn release_candidate_of_line(input: &str) {
    let constraints = ConstraintSet::parse(input).expect("must parse");
    let candidates = [version!("6.4.4.0"), version!("6.5.0.0-rc1")];
    let matched = candidates.iter().find(|v| constraints.check(v));
    assert_eq!(matched.map(Version::to_string), Some(String::from("6.5.0.0-rc1")));
}

#[test_case(">=6.4", "6.5.0.0-rc1", false; "greater_or_equal_other_line")]
#[test_case("<6.6", "6.5.0.0-rc1", false; "less_other_line")]
#[test_case("^6.4", "6.5.0.0-rc1", true; "caret_other_line")]
#[test_case("=6.5.0.0-rc1", "6.5.0.0-rc1", true; "equal_prerelease")]
#[test_case("!=6.5.0.0-rc1", "6.5.0.0-rc2", true; "not_equal_prerelease")]
#[test_case("!=6.5", "6.5.0.0", false; "not_equal_padded")]
#[test_case(">=6.5.0.0-rc1", "6.5.0.0-rc2", true; "prerelease_constraint_same_line")]
#[test_case(">=6.5.0.0-rc1", "6.5.0.0", true; "prerelease_constraint_stable")]
#[test_case(">6.4 <6.5", "6.4.9.9", true; "between")]
#[test_case("<=6.4", "6.4.0.1", false; "less_or_equal_above")]
#[test]
fn evaluates(input: &str, version: &str, expected: bool) {
    let constraints = ConstraintSet::parse(input).expect("must parse");
    assert_eq!(
        constraints.check(&version!(version)),
        expected,
        "'{version}' against '{input}'"
    );
}

#[test_case(""; "empty")]
#[test_case("   "; "whitespace")]
#[test_case("6.5.*"; "wildcard")]
#[test_case(">= 1.0"; "space_after_operator")]
#[test_case(">=1.0,,<2.0"; "empty_token")]
#[test_case(">=1.0,"; "trailing_comma")]
#[test_case("|| ~6.5"; "empty_branch")]
#[test_case("=>1.0"; "unknown_operator")]
#[test_case("~6.4 || latest"; "not_a_version")]
#[test]
fn rejects(input: &str) {
    assert_matches!(ConstraintSet::parse(input), Err(Error::Parse(_)));
}

#[test]
fn rejection_names_token() {
    assert_matches!(
        ConstraintSet::parse("~6.4 || 6.5.*"),
        Err(Error::Parse(ParseError::Constraint { token, error: Some(_), .. })) if token == "6.5.*"
    );
}

#[test]
fn constructs_constraint() {
    let constraint = Constraint::new(Operator::Caret, version!("6.5"));
    assert_eq!(constraint.to_string(), "^6.5");
    assert!(constraint.check(&version!("6.6.0.0")));

    let constraints = ConstraintSet::from(constraint);
    assert_eq!(constraints, constraints!("^6.5"));
}

#[test_case("1.3.0", false; "next_minor")]
#[test_case("1.2.5", true; "next_patch")]
#[test_case("1.2.0", false; "below")]
#[test]
fn pessimistic_on_incremented_version(version: &str, expected: bool) {
    let built = Constraint::new(Operator::Pessimistic, version!("1.2").with_patch_incremented());
    let parsed = constraints!("~>1.2.1");
    assert_eq!(ConstraintSet::from(built.clone()), parsed);

    let version = version!(version);
    assert_eq!(built.check(&version), expected);
    assert_eq!(parsed.check(&version), expected);
}

#[test]
fn operator_symbols() {
    let symbols = Operator::iter().map(|op| op.to_string()).join(" ");
    assert_eq!(symbols, "= != > < >= <= ~> ^ ~");
}
