use std::{
    borrow::Cow,
    cmp::Ordering,
    hash::{Hash, Hasher},
    str::FromStr,
};

use bon::bon;
use compact_str::{CompactString, ToCompactString};
use documented::Documented;
use duplicate::duplicate;
use nom::{
    Finish, IResult, Parser,
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1, satisfy},
    combinator::{eof, opt, recognize},
    multi::{many0, separated_list1},
    sequence::{pair, preceded},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{
    PartialSchema, ToSchema,
    openapi::{ObjectBuilder, Type},
};

use crate::{Error, ParseError, error};

/// Numeric segments are always rendered at least this wide: `1.2` renders as `1.2.0`.
const RENDERED_SEGMENTS: usize = 3;

/// A parsed version, as used for Shopware releases and extensions.
///
/// Versions are made of any number of numeric segments (usually `major.minor.patch.build`,
/// like `6.5.8.2`), an optional prerelease label, and optional build metadata:
/// - `6.5.0.0-rc1`
/// - `v1.2.3`
/// - `1.7rc2` (the dash before a prerelease label starting with a letter is optional)
/// - `1.2.0+build.5`
///
/// Absent segments count as zero, so `1.2` is equal to `1.2.0.0`.
/// A prerelease sorts before the release it precedes, and build metadata
/// never affects ordering or equality.
///
/// The exact input is kept and available through [`Version::original`],
/// while [`Display`](std::fmt::Display) renders the canonical form.
#[derive(Clone, Debug, Documented)]
pub struct Version {
    /// Numeric segments, zero-padded to at least three.
    segments: Vec<u64>,

    /// The number of segments written in the input.
    specified: usize,

    prerelease: Option<CompactString>,
    metadata: Option<CompactString>,

    /// The original input.
    original: CompactString,
}

#[bon]
impl Version {
    /// Construct a version from its parts.
    ///
    /// The canonical rendering of the version becomes its [`Version::original`] text.
    /// The prerelease label and metadata are not validated.
    ///
    /// ```
    /// # use shopware_version::Version;
    /// let version = Version::builder().major(6).minor(5).revision(0).prerelease("rc1").build();
    /// assert_eq!(version.to_string(), "6.5.0.0-rc1");
    /// ```
    #[builder]
    pub fn new(
        major: u64,
        #[builder(default)] minor: u64,
        #[builder(default)] patch: u64,
        revision: Option<u64>,
        #[builder(into)] prerelease: Option<CompactString>,
        #[builder(into)] metadata: Option<CompactString>,
    ) -> Self {
        let mut segments = vec![major, minor, patch];
        segments.extend(revision);
        let specified = segments.len();
        Self::from_parts(segments, specified, prerelease, metadata)
    }
}

impl Version {
    /// Parse a version.
    ///
    /// Accepts an optional leading `v`, one or more numeric segments separated by `.`,
    /// an optional prerelease label and optional `+` build metadata.
    #[tracing::instrument]
    pub fn parse(input: &str) -> Result<Self, Error> {
        if input.is_empty() {
            error::fatal!(ParseError::Empty);
        }
        Ok(parse_version(input)?)
    }

    /// The exact text this version was parsed from.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The numeric segments, zero-padded to at least three.
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    /// The number of numeric segments written in the input (`6.5` has two).
    pub fn specified_segments(&self) -> usize {
        self.specified
    }

    /// The segment at `index`, where absent segments are zero.
    pub fn segment(&self, index: usize) -> u64 {
        self.segments.get(index).copied().unwrap_or_default()
    }

    /// The prerelease label, like `rc1` in `6.5.0.0-rc1`.
    pub fn prerelease(&self) -> Option<&str> {
        self.prerelease.as_deref()
    }

    /// The build metadata, like `build.5` in `1.2.0+build.5`.
    pub fn metadata(&self) -> Option<&str> {
        self.metadata.as_deref()
    }

    /// Report whether the version carries a prerelease label.
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// Compare with another version.
    ///
    /// This is the same as [`Ord::cmp`]; it exists so callers don't need the trait in scope.
    pub fn compare(&self, other: &Version) -> Ordering {
        self.cmp(other)
    }

    /// Report whether the numeric segments of both versions are equal,
    /// ignoring prerelease labels and metadata.
    pub fn same_release(&self, other: &Version) -> bool {
        self.cmp_segments(other).is_eq()
    }

    /// The next version: the last written segment is incremented.
    ///
    /// `1.2.3` becomes `1.2.4`, `6.5.0.0` becomes `6.5.0.1`, and `1.2` becomes `1.2.1`
    /// since it renders as `1.2.0`. Every rendered segment counts as written in the result,
    /// so `1.2` increments to a version with three [`Version::specified_segments`].
    /// Prerelease labels and metadata are dropped.
    pub fn with_patch_incremented(&self) -> Version {
        let mut segments = self.segments.clone();
        if let Some(last) = segments.last_mut() {
            *last = last.saturating_add(1);
        }
        let specified = segments.len();
        Self::from_parts(segments, specified, None, None)
    }

    fn from_parts(
        mut segments: Vec<u64>,
        specified: usize,
        prerelease: Option<CompactString>,
        metadata: Option<CompactString>,
    ) -> Self {
        if segments.len() < RENDERED_SEGMENTS {
            segments.resize(RENDERED_SEGMENTS, 0);
        }
        let mut version = Self {
            segments,
            specified,
            prerelease,
            metadata,
            original: CompactString::default(),
        };
        version.original = version.to_compact_string();
        version
    }

    fn cmp_segments(&self, other: &Version) -> Ordering {
        let width = self.segments.len().max(other.segments.len());
        (0..width)
            .map(|i| self.segment(i).cmp(&other.segment(i)))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Segments with trailing zeros removed, so that `1.2` and `1.2.0.0` agree.
    fn significant_segments(&self) -> &[u64] {
        let len = self
            .segments
            .iter()
            .rposition(|&s| s != 0)
            .map_or(0, |i| i + 1);
        &self.segments[..len]
    }
}

duplicate! {
    [
        method                      description                 predicate;
        [ equal ]                   [ "equal to" ]              [ is_eq ];
        [ less_than ]               [ "less than" ]             [ is_lt ];
        [ greater_than ]            [ "greater than" ]          [ is_gt ];
        [ less_than_or_equal ]      [ "at most" ]               [ is_le ];
        [ greater_than_or_equal ]   [ "at least" ]              [ is_ge ];
    ]
    impl Version {
        #[doc = concat!("Report whether `self` is ", description, " `other`.")]
        pub fn method(&self, other: &Version) -> bool {
            self.cmp(other).predicate()
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut segments = self.segments.iter();
        if let Some(first) = segments.next() {
            write!(f, "{first}")?;
        }
        for segment in segments {
            write!(f, ".{segment}")?;
        }
        if let Some(prerelease) = &self.prerelease {
            write!(f, "-{prerelease}")?;
        }
        if let Some(metadata) = &self.metadata {
            write!(f, "+{metadata}")?;
        }
        Ok(())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_segments(other).then_with(|| {
            match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => compare_labels(a, b),
            }
        })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for Version {}

// Labels only compare equal when they are identical, and trailing zero segments
// never affect ordering, so hashing both of those keeps `Hash` consistent with `Eq`.
impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant_segments().hash(state);
        self.prerelease.hash(state);
    }
}

/// Compare prerelease labels identifier by identifier.
///
/// Numeric identifiers compare numerically and sort before alphanumeric ones,
/// alphanumeric identifiers use natural ordering (`rc2` < `rc10`),
/// and a label that runs out of identifiers first sorts first.
fn compare_labels(a: &str, b: &str) -> Ordering {
    let mut a = a.split('.');
    let mut b = b.split('.');
    loop {
        let ord = match (a.next(), b.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(a), Some(b)) => compare_identifiers(a, b),
        };
        if ord.is_ne() {
            return ord;
        }
    }
}

fn compare_identifiers(a: &str, b: &str) -> Ordering {
    let ord = match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => alphanumeric_sort::compare_str(a, b),
    };
    // `01` and `1` are still distinct labels.
    ord.then_with(|| a.cmp(b))
}

/// The textual parts of a version, as borrowed from the input.
struct Parts<'a> {
    segments: Vec<&'a str>,
    prerelease: Option<&'a str>,
    metadata: Option<&'a str>,
}

fn is_identifier(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '~'
}

/// Any number of `.identifier` groups.
fn dotted(input: &str) -> IResult<&str, &str> {
    recognize(many0(pair(char('.'), take_while1(is_identifier)))).parse(input)
}

/// A prerelease label that starts with a digit must be introduced by `-`.
fn numeric_label(input: &str) -> IResult<&str, &str> {
    preceded(
        char('-'),
        recognize((digit1, take_while(is_identifier), dotted)),
    )
    .parse(input)
}

/// A prerelease label that starts with a letter may omit the `-`, as in `1.7rc2`.
fn alpha_label(input: &str) -> IResult<&str, &str> {
    preceded(
        opt(char('-')),
        recognize((
            satisfy(|c| c.is_ascii_alphabetic() || c == '-' || c == '~'),
            take_while(is_identifier),
            dotted,
        )),
    )
    .parse(input)
}

fn metadata(input: &str) -> IResult<&str, &str> {
    preceded(char('+'), recognize(pair(take_while1(is_identifier), dotted))).parse(input)
}

fn version(input: &str) -> IResult<&str, Parts<'_>> {
    (
        opt(char('v')),
        separated_list1(char('.'), digit1),
        opt(alt((numeric_label, alpha_label))),
        opt(metadata),
        eof,
    )
        .map(|(_, segments, prerelease, metadata, _)| Parts {
            segments,
            prerelease,
            metadata,
        })
        .parse(input)
}

/// Parse a version, reporting the location of any problem in the input.
pub(crate) fn parse_version(input: &str) -> Result<Version, ParseError> {
    let (_, parts) = version(input)
        .finish()
        .map_err(|err: nom::error::Error<&str>| {
            let message = if err.input.is_empty() {
                String::from("unexpected end of input")
            } else {
                format!("unexpected '{}'", err.input)
            };
            ParseError::Version {
                input: input.to_string(),
                message,
                span: error::span(input, err.input),
            }
        })?;

    let segments = parts
        .segments
        .into_iter()
        .map(|segment| {
            segment.parse::<u64>().map_err(|err| ParseError::Segment {
                input: input.to_string(),
                segment: segment.to_string(),
                error: err,
                span: error::span(input, segment),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let specified = segments.len();
    let mut version = Version::from_parts(
        segments,
        specified,
        parts.prerelease.map(CompactString::from),
        parts.metadata.map(CompactString::from),
    );
    version.original = input.to_compact_string();
    Ok(version)
}

impl From<semver::Version> for Version {
    fn from(value: semver::Version) -> Self {
        Self::from(&value)
    }
}

impl From<&semver::Version> for Version {
    fn from(value: &semver::Version) -> Self {
        Version::builder()
            .major(value.major)
            .minor(value.minor)
            .patch(value.patch)
            .maybe_prerelease((!value.pre.is_empty()).then(|| value.pre.as_str()))
            .maybe_metadata((!value.build.is_empty()).then(|| value.build.as_str()))
            .build()
    }
}

impl From<&Version> for Version {
    fn from(value: &Version) -> Self {
        value.clone()
    }
}

impl FromStr for Version {
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
    impl TryFrom<input_type> for Version {
        type Error = Error;

        fn try_from(value: input_type) -> Result<Self, Self::Error> {
            Self::parse(&value)
        }
    }
}

impl AsRef<Version> for Version {
    fn as_ref(&self) -> &Version {
        self
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.original.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl PartialSchema for Version {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        ObjectBuilder::new()
            .description(Some(Self::DOCS))
            .examples([json!("6.5.8.2"), json!("6.6.0.0-rc1"), json!("v1.2.3")])
            .min_length(Some(1))
            .schema_type(Type::String)
            .build()
            .into()
    }
}

impl ToSchema for Version {
    fn name() -> Cow<'static, str> {
        Cow::Borrowed("Version")
    }
}

/// Parse a [`Version`] from a literal, panicking if it is invalid.
///
/// ```
/// let version = shopware_version::version!("6.5.0.0-rc1");
/// assert_eq!(version.prerelease(), Some("rc1"));
/// ```
#[macro_export]
macro_rules! version {
    ($input:expr) => {
        $crate::Version::parse($input).expect("parse version")
    };
}
