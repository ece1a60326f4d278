use documented::Documented;
use serde::{Deserialize, Serialize};

use crate::{ConstraintSet, Error, Version, error};

/// A collection of versions, such as the releases of Shopware or of an extension.
///
/// The collection keeps the order it was built with until it is sorted.
///
/// ```
/// # use shopware_version::{ConstraintSet, Versions};
/// let versions = Versions::parse_lenient(["6.4.0.0", "6.5.0.0-rc1", "not a version", "6.5.0.0"]);
/// assert_eq!(versions.len(), 3);
///
/// let constraints = ConstraintSet::parse("~6.5.0")?;
/// assert_eq!(versions.min_matching(&constraints)?.to_string(), "6.5.0.0");
/// # Ok::<(), shopware_version::Error>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Documented, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Versions(Vec<Version>);

impl Versions {
    /// Parse each input as a version, skipping the ones that are not valid versions.
    #[tracing::instrument(skip_all)]
    pub fn parse_lenient<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        inputs
            .into_iter()
            .filter_map(|input| {
                let input = input.as_ref();
                Version::parse(input)
                    .inspect_err(|err| tracing::debug!(input, %err, "skip invalid version"))
                    .ok()
            })
            .collect()
    }

    /// Iterate over the versions in their current order.
    pub fn iter(&self) -> impl Iterator<Item = &Version> {
        self.0.iter()
    }

    /// The number of versions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Report whether the collection holds no versions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// View the versions as a slice.
    pub fn as_slice(&self) -> &[Version] {
        &self.0
    }

    /// Sort ascending. Versions that compare equal keep their relative order.
    pub fn sort(&mut self) {
        self.0.sort();
    }

    /// Sort descending, newest first. Versions that compare equal keep their relative order.
    pub fn sort_descending(&mut self) {
        self.0.sort_by(|a, b| b.cmp(a));
    }

    /// The greatest version in the collection.
    pub fn latest(&self) -> Option<&Version> {
        self.iter().max()
    }

    /// The versions satisfying `constraints`, in their current order.
    #[tracing::instrument(skip_all, fields(%constraints))]
    pub fn filter(&self, constraints: &ConstraintSet) -> Versions {
        self.iter()
            .filter(|version| constraints.check(version))
            .cloned()
            .collect()
    }

    /// The lowest version satisfying `constraints`.
    ///
    /// Stable releases are preferred: a prerelease is only returned when no stable release matches.
    #[tracing::instrument(skip_all, fields(%constraints))]
    pub fn min_matching(&self, constraints: &ConstraintSet) -> Result<&Version, Error> {
        let stable = self.lowest(constraints, |version| !version.is_prerelease());
        if let Some(version) = stable {
            return Ok(version);
        }

        match self.lowest(constraints, Version::is_prerelease) {
            Some(version) => Ok(version),
            None => error::fatal!(Error::NoMatchingVersion {
                constraints: constraints.to_string(),
            }),
        }
    }

    /// Like [`Versions::min_matching`], but falls back to the lowest version
    /// in the collection when nothing matches.
    ///
    /// Tooling that always needs some version to build against relies on this;
    /// prefer [`Versions::min_matching`] when a mismatch should be reported.
    pub fn min_matching_or_lowest(&self, constraints: &ConstraintSet) -> Option<&Version> {
        self.min_matching(constraints).ok().or_else(|| {
            tracing::debug!(%constraints, "no version matches, using lowest");
            self.iter().min()
        })
    }

    fn lowest(
        &self,
        constraints: &ConstraintSet,
        include: impl Fn(&Version) -> bool,
    ) -> Option<&Version> {
        self.iter()
            .filter(|&version| include(version) && constraints.check(version))
            .min()
    }
}

impl From<Vec<Version>> for Versions {
    fn from(versions: Vec<Version>) -> Self {
        Self(versions)
    }
}

impl From<Versions> for Vec<Version> {
    fn from(versions: Versions) -> Self {
        versions.0
    }
}

impl FromIterator<Version> for Versions {
    fn from_iter<T: IntoIterator<Item = Version>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Versions {
    type Item = Version;
    type IntoIter = std::vec::IntoIter<Version>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Versions {
    type Item = &'a Version;
    type IntoIter = std::slice::Iter<'a, Version>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
