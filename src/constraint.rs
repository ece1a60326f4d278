//! # Version Constraints
//!
//! Constraints decide whether a [`Version`] is acceptable,
//! for example whether an extension supports a given Shopware release.
//!
//! ## Syntax
//!
//! A constraint set is an OR of AND groups:
//!
//! - `|` or `||` separates alternatives: `~6.4 || ~6.5`
//! - `,` or whitespace separates requirements that must all hold: `>=6.4.20.0, <6.6`
//! - Each requirement is an optional [`Operator`] followed by a version: `^6.5`, `6.5.8.2`
//!
//! A missing operator means equality.
//!
//! ## Prereleases
//!
//! Prerelease versions only satisfy ordering constraints within their own release line:
//! `>=6.4` does not accept `6.5.0.0-rc1`, but `>=6.5`, `^6.5` and `~>6.5.0` do,
//! since `6.5.0.0-rc1` is a prerelease of the `6.5` line itself.
//! This lets tooling pick a release candidate as the lowest supported version
//! before the stable release of that line exists.
//!
//! ## Core Components
//!
//! - [`Operator`]: The relation a constraint tests.
//! - [`Constraint`]: One operator applied to one version.
//! - [`ConstraintGroup`]: Constraints that must all match.
//! - [`ConstraintSet`]: Groups of which at least one must match.

use std::{borrow::Cow, cmp::Ordering, str::FromStr};

use compact_str::CompactString;
use derive_more::Display;
use documented::Documented;
use duplicate::duplicate;
use enum_assoc::Assoc;
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use serde_json::json;
use strum::EnumIter;
use utoipa::{
    PartialSchema, ToSchema,
    openapi::{ObjectBuilder, Type},
};

use crate::{Error, Version};

mod parse;

/// The relation tested by a [`Constraint`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Assoc, EnumIter, Documented)]
#[func(const fn text(&self) -> &'static str)]
#[non_exhaustive]
pub enum Operator {
    /// `=`, or no operator at all: the version must be equal.
    #[assoc(text = "=")]
    Equal,

    /// `!=`: the version must not be equal.
    #[assoc(text = "!=")]
    NotEqual,

    /// `>`: the version must be greater.
    #[assoc(text = ">")]
    Greater,

    /// `<`: the version must be less.
    #[assoc(text = "<")]
    Less,

    /// `>=`: the version must be greater or equal.
    #[assoc(text = ">=")]
    GreaterOrEqual,

    /// `<=`: the version must be less or equal.
    #[assoc(text = "<=")]
    LessOrEqual,

    /// `~>`: pessimistic constraint.
    ///
    /// All segments written in the constraint except the last must be equal,
    /// and the last may only grow: `~>6.5.0` accepts `6.5.3` but not `6.6.0`,
    /// while `~>6.5` accepts `6.9` but not `7.0`.
    /// A prerelease constraint only accepts prereleases.
    #[assoc(text = "~>")]
    Pessimistic,

    /// `^`: the version must be at least the constraint, within the same major version.
    #[assoc(text = "^")]
    Caret,

    /// `~`: the version must be at least the constraint, within the same major version.
    #[assoc(text = "~")]
    Tilde,
}

impl Operator {
    /// The symbol this operator is written with, like `>=`.
    pub const fn symbol(self) -> &'static str {
        self.text()
    }

    /// Evaluate `version` against `target` using this operator.
    pub fn matches(self, version: &Version, target: &Version) -> bool {
        match self {
            Operator::Equal => version == target,
            Operator::NotEqual => version != target,
            Operator::Greater => ordered(version, target, Ordering::is_gt),
            Operator::Less => ordered(version, target, Ordering::is_lt),
            Operator::GreaterOrEqual => ordered(version, target, Ordering::is_ge),
            Operator::LessOrEqual => ordered(version, target, Ordering::is_le),
            Operator::Pessimistic => pessimistic(version, target),
            Operator::Caret | Operator::Tilde => same_major_at_least(version, target),
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A prerelease only satisfies ordering constraints within its own release line.
fn prerelease_compatible(version: &Version, target: &Version) -> bool {
    !version.is_prerelease() || version.same_release(target)
}

/// Order `version` against `target`, treating prereleases of a stable target's
/// release line as equal to the target.
fn release_line_cmp(version: &Version, target: &Version) -> Ordering {
    if version.is_prerelease() && !target.is_prerelease() && version.same_release(target) {
        Ordering::Equal
    } else {
        version.cmp(target)
    }
}

fn ordered(version: &Version, target: &Version, accept: fn(Ordering) -> bool) -> bool {
    prerelease_compatible(version, target) && accept(release_line_cmp(version, target))
}

fn pessimistic(version: &Version, target: &Version) -> bool {
    if !prerelease_compatible(version, target) {
        return false;
    }
    if target.is_prerelease() && !version.is_prerelease() {
        return false;
    }
    if release_line_cmp(version, target).is_lt() {
        return false;
    }

    let last = target.specified_segments().saturating_sub(1);
    (0..last).all(|i| version.segment(i) == target.segment(i))
        && version.segment(last) >= target.segment(last)
}

fn same_major_at_least(version: &Version, target: &Version) -> bool {
    !release_line_cmp(version, target).is_lt() && version.segment(0) == target.segment(0)
}

/// A single requirement, like `>=6.4.20.0`.
///
/// The operator is resolved when the constraint is parsed;
/// the token it was parsed from is kept for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Getters, CopyGetters, Documented, Display)]
#[display("{original}")]
pub struct Constraint {
    /// The relation this constraint tests.
    #[getset(get_copy = "pub")]
    operator: Operator,

    /// The version the candidate is compared against.
    #[getset(get = "pub")]
    version: Version,

    original: CompactString,
}

impl Constraint {
    /// Create a constraint from an operator and a version.
    ///
    /// The constraint renders as the operator symbol followed by the version's original text.
    pub fn new(operator: Operator, version: impl Into<Version>) -> Self {
        let version = version.into();
        let original = compact_str::format_compact!("{operator}{}", version.original());
        Self {
            operator,
            version,
            original,
        }
    }

    /// Report whether `version` satisfies this constraint.
    pub fn check(&self, version: &Version) -> bool {
        let matched = self.operator.matches(version, &self.version);
        tracing::trace!(constraint = %self, %version, matched, "check constraint");
        matched
    }

    /// Report whether the constraint's version carries a prerelease label.
    pub fn is_prerelease(&self) -> bool {
        self.version.is_prerelease()
    }

    /// View the constraint as the text it was parsed from.
    pub fn as_str(&self) -> &str {
        &self.original
    }
}

/// Constraints that must all be satisfied, like `~6.4,>=6.4.20.0`.
#[derive(Clone, Debug, PartialEq, Eq, Documented)]
pub struct ConstraintGroup {
    constraints: Vec<Constraint>,
}

impl ConstraintGroup {
    /// Iterate over the constraints in the group.
    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    /// Report whether `version` satisfies every constraint in the group.
    pub fn check(&self, version: &Version) -> bool {
        self.iter().all(|constraint| constraint.check(version))
    }
}

impl From<Vec<Constraint>> for ConstraintGroup {
    fn from(constraints: Vec<Constraint>) -> Self {
        Self { constraints }
    }
}

impl From<Constraint> for ConstraintGroup {
    fn from(constraint: Constraint) -> Self {
        Self::from(vec![constraint])
    }
}

impl std::fmt::Display for ConstraintGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        join(f, self.iter(), ",")
    }
}

fn join<T: std::fmt::Display>(
    f: &mut std::fmt::Formatter<'_>,
    items: impl Iterator<Item = T>,
    separator: &str,
) -> std::fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Alternative constraint groups, at least one of which must be satisfied,
/// like `~6.4,>=6.4.20.0||~6.5`.
///
/// ```
/// # use shopware_version::{ConstraintSet, Version};
/// let constraints = ConstraintSet::parse("~6.4 >=6.4.20.0 || ~6.5")?;
/// assert_eq!(constraints.to_string(), "~6.4,>=6.4.20.0||~6.5");
///
/// assert!(constraints.check(&Version::parse("6.4.20.0")?));
/// assert!(constraints.check(&Version::parse("6.5.0.0-rc1")?));
/// assert!(!constraints.check(&Version::parse("6.4.0.0")?));
/// # Ok::<(), shopware_version::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Documented)]
pub struct ConstraintSet {
    groups: Vec<ConstraintGroup>,
}

impl ConstraintSet {
    /// Parse a constraint set.
    ///
    /// Fails if the input is empty or if any requirement in it is malformed;
    /// partially valid input never produces a constraint set.
    #[tracing::instrument]
    pub fn parse(input: &str) -> Result<Self, Error> {
        Ok(parse::constraint_set(input)?)
    }

    /// Iterate over the alternative groups.
    pub fn iter(&self) -> impl Iterator<Item = &ConstraintGroup> {
        self.groups.iter()
    }

    /// Iterate over every constraint in every group.
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.iter().flat_map(ConstraintGroup::iter)
    }

    /// Report whether `version` satisfies any group in the set.
    pub fn check(&self, version: &Version) -> bool {
        self.iter().any(|group| group.check(version))
    }
}

impl From<Vec<ConstraintGroup>> for ConstraintSet {
    fn from(groups: Vec<ConstraintGroup>) -> Self {
        Self { groups }
    }
}

impl From<ConstraintGroup> for ConstraintSet {
    fn from(group: ConstraintGroup) -> Self {
        Self::from(vec![group])
    }
}

impl From<Constraint> for ConstraintSet {
    fn from(constraint: Constraint) -> Self {
        Self::from(ConstraintGroup::from(constraint))
    }
}

impl std::fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        join(f, self.iter(), "||")
    }
}

impl FromStr for ConstraintSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

duplicate! {
    [
        input_type;
        [ &str ];
        [ String ];
        [ &String ];
    ]
    impl TryFrom<input_type> for ConstraintSet {
        type Error = Error;

        fn try_from(value: input_type) -> Result<Self, Self::Error> {
            Self::parse(&value)
        }
    }
}

impl Serialize for ConstraintSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConstraintSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl PartialSchema for ConstraintSet {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        ObjectBuilder::new()
            .description(Some(Self::DOCS))
            .examples([json!("~6.5.0"), json!("~6.4 >=6.4.20.0 || ~6.5"), json!(">=6.4.18.0")])
            .min_length(Some(1))
            .schema_type(Type::String)
            .build()
            .into()
    }
}

impl ToSchema for ConstraintSet {
    fn name() -> Cow<'static, str> {
        Cow::Borrowed("ConstraintSet")
    }
}

/// Parse a [`ConstraintSet`] from a literal, panicking if it is invalid.
///
/// ```
/// let constraints = shopware_version::constraints!("~6.5.0");
/// assert!(constraints.check(&shopware_version::version!("6.5.3.0")));
/// ```
#[macro_export]
macro_rules! constraints {
    ($input:expr) => {
        $crate::ConstraintSet::parse($input).expect("parse constraints")
    };
}
