//! Plugin versions and version constraint expressions.
//!
//! A constraint is a single operator followed by a full
//! `major.minor.patch[-prerelease]` version:
//!
//! | operator | admits |
//! |----------|--------|
//! | `=`      | exactly that version, prerelease included |
//! | `>=` `<=` `>` `<` | numeric ordering on `(major, minor, patch)` |
//! | `~>`     | `>=v` and below the next minor (`~>1.2.3` is `>=1.2.3,<1.3.0`) |
//! | `^`      | `>=v` and below the next major (`^1.2.3` is `>=1.2.3,<2.0.0`) |
//!
//! Major version zero gets no special treatment: `^0.2.0` admits every
//! `0.x.y` at or above `0.2.0`.
//!
//! # Examples
//!
//! ```
//! use potion_core::version::{Constraint, Version};
//!
//! let constraint = Constraint::parse("~>1.2.3").unwrap();
//! assert!(constraint.matches(&Version::parse("1.2.9").unwrap()));
//! assert!(!constraint.matches(&Version::parse("1.3.0").unwrap()));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// `(major, minor, patch)`: the part of a version that takes part in ordering.
pub type Triple = (u64, u64, u64);

/// A failure to parse a version or constraint expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version constraint '{expression}': {reason}")]
pub struct ConstraintError {
    pub expression: String,
    pub reason: String,
}

impl ConstraintError {
    fn new(expression: &str, reason: impl Into<String>) -> Self {
        Self {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }
}

/// A concrete plugin version.
///
/// Build metadata is kept for display only and never affects matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
    pub build: Option<String>,
}

impl Version {
    /// Create a release version with no prerelease or build suffix.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
        }
    }

    /// Parse `major.minor.patch[-prerelease][+build]`.
    ///
    /// Numeric components are any run of ASCII digits that fits in a `u64`,
    /// leading zeros included. Prerelease and build identifiers use the
    /// characters `[A-Za-z0-9.-]`.
    pub fn parse(s: &str) -> Result<Self, ConstraintError> {
        parse_version(s, s.trim())
    }

    /// The ordering key of this version.
    pub fn triple(&self) -> Triple {
        (self.major, self.minor, self.patch)
    }
}

/// Parse `text` as a version, reporting failures against `expression`.
fn parse_version(expression: &str, text: &str) -> Result<Version, ConstraintError> {
    let (rest, build) = match text.split_once('+') {
        Some((rest, build)) => (rest, Some(build)),
        None => (text, None),
    };
    let (core, prerelease) = match rest.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (rest, None),
    };

    let mut parts = core.split('.');
    let mut component = |label: &str| -> Result<u64, ConstraintError> {
        let part = parts.next().ok_or_else(|| {
            ConstraintError::new(expression, format!("missing {label} version number"))
        })?;
        parse_number(part).ok_or_else(|| {
            ConstraintError::new(
                expression,
                format!("{label} version '{part}' is not a non-negative integer"),
            )
        })
    };
    let major = component("major")?;
    let minor = component("minor")?;
    let patch = component("patch")?;
    if parts.next().is_some() {
        return Err(ConstraintError::new(
            expression,
            "expected exactly three version numbers",
        ));
    }

    Ok(Version {
        major,
        minor,
        patch,
        prerelease: parse_identifiers(expression, "prerelease", prerelease)?,
        build: parse_identifiers(expression, "build metadata", build)?,
    })
}

fn parse_number(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

fn parse_identifiers(
    expression: &str,
    label: &str,
    value: Option<&str>,
) -> Result<Option<String>, ConstraintError> {
    let Some(value) = value else {
        return Ok(None);
    };
    if value.is_empty() {
        return Err(ConstraintError::new(expression, format!("empty {label}")));
    }
    if let Some(bad) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '.' || *c == '-'))
    {
        return Err(ConstraintError::new(
            expression,
            format!("invalid character '{bad}' in {label}"),
        ));
    }
    Ok(Some(value.to_string()))
}

/// The smallest triple greater than `t`, or `None` past the largest one.
fn successor((major, minor, patch): Triple) -> Option<Triple> {
    match patch.checked_add(1) {
        Some(patch) => Some((major, minor, patch)),
        None => next_minor((major, minor, 0)),
    }
}

/// The first triple of the next minor series, or `None` if there is none.
fn next_minor((major, minor, _): Triple) -> Option<Triple> {
    match minor.checked_add(1) {
        Some(minor) => Some((major, minor, 0)),
        None => next_major((major, 0, 0)),
    }
}

/// The first triple of the next major series, or `None` if there is none.
fn next_major((major, _, _): Triple) -> Option<Triple> {
    major.checked_add(1).map(|major| (major, 0, 0))
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.prerelease {
            write!(f, "-{pre}")?;
        }
        if let Some(build) = &self.build {
            write!(f, "+{build}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A constraint operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Exact,
    /// `>=`
    Gte,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `~>`
    Pessimistic,
    /// `^`
    Caret,
}

impl Operator {
    // Two-character operators first so `>=` is not read as `>`.
    const PREFIXES: [(&'static str, Operator); 7] = [
        (">=", Operator::Gte),
        ("<=", Operator::Lte),
        ("~>", Operator::Pessimistic),
        (">", Operator::Gt),
        ("<", Operator::Lt),
        ("=", Operator::Exact),
        ("^", Operator::Caret),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Exact => "=",
            Operator::Gte => ">=",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Pessimistic => "~>",
            Operator::Caret => "^",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed constraint expression: one operator and one version bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
    pub op: Operator,
    pub version: Version,
}

impl Constraint {
    pub fn new(op: Operator, version: Version) -> Self {
        Self { op, version }
    }

    /// The constraint admitting every version.
    pub fn any() -> Self {
        Self::new(Operator::Gte, Version::new(0, 0, 0))
    }

    /// Parse an expression such as `>=1.0.0`, `~>1.2.3` or `=2.0.0-beta.1`.
    pub fn parse(expression: &str) -> Result<Self, ConstraintError> {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Err(ConstraintError::new(expression, "empty constraint"));
        }

        let (op, rest) = Operator::PREFIXES
            .iter()
            .find_map(|(prefix, op)| trimmed.strip_prefix(prefix).map(|rest| (*op, rest)))
            .ok_or_else(|| {
                ConstraintError::new(
                    expression,
                    "expected one of the operators =, >=, <=, >, <, ~>, ^",
                )
            })?;

        let version_str = rest.trim();
        if version_str.is_empty() {
            return Err(ConstraintError::new(expression, "missing version"));
        }
        if version_str.contains('+') {
            return Err(ConstraintError::new(
                expression,
                "build metadata is not allowed in constraints",
            ));
        }

        let version = parse_version(expression, version_str)?;
        Ok(Self::new(op, version))
    }

    /// Check whether `candidate` satisfies this constraint.
    pub fn matches(&self, candidate: &Version) -> bool {
        match self.op {
            Operator::Exact => {
                candidate.triple() == self.version.triple()
                    && candidate.prerelease == self.version.prerelease
            }
            _ => self.range().contains(candidate.triple()),
        }
    }

    /// The half-open range of `(major, minor, patch)` triples this constraint admits.
    ///
    /// An upper bound past the largest representable triple is left unbounded.
    pub fn range(&self) -> VersionRange {
        let v = self.version.triple();
        match self.op {
            Operator::Exact => VersionRange::new(Some(v), successor(v)),
            Operator::Gte => VersionRange::new(Some(v), None),
            Operator::Gt => match successor(v) {
                Some(next) => VersionRange::new(Some(next), None),
                None => VersionRange::EMPTY,
            },
            Operator::Lte => VersionRange::new(None, successor(v)),
            Operator::Lt => VersionRange::new(None, Some(v)),
            Operator::Pessimistic => VersionRange::new(Some(v), next_minor(v)),
            Operator::Caret => VersionRange::new(Some(v), next_major(v)),
        }
    }

    /// Whether no single version could ever satisfy both constraints.
    pub fn is_disjoint(&self, other: &Constraint) -> bool {
        if self.op == Operator::Exact
            && other.op == Operator::Exact
            && self.version.triple() == other.version.triple()
        {
            return self.version.prerelease != other.version.prerelease;
        }
        self.range().intersect(&other.range()).is_empty()
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.version)
    }
}

impl FromStr for Constraint {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Constraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Constraint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A half-open interval `[lower, upper)` over version triples.
///
/// `None` means unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRange {
    pub lower: Option<Triple>,
    pub upper: Option<Triple>,
}

impl VersionRange {
    /// The range admitting nothing.
    pub const EMPTY: VersionRange = VersionRange {
        lower: None,
        upper: Some((0, 0, 0)),
    };

    pub fn new(lower: Option<Triple>, upper: Option<Triple>) -> Self {
        Self { lower, upper }
    }

    pub fn intersect(&self, other: &VersionRange) -> VersionRange {
        let lower = match (self.lower, other.lower) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        let upper = match (self.upper, other.upper) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        VersionRange { lower, upper }
    }

    pub fn is_empty(&self) -> bool {
        match (self.lower, self.upper) {
            (Some(lower), Some(upper)) => lower >= upper,
            (None, Some(upper)) => upper == (0, 0, 0),
            _ => false,
        }
    }

    pub fn contains(&self, triple: Triple) -> bool {
        self.lower.is_none_or(|lower| triple >= lower) && self.upper.is_none_or(|upper| triple < upper)
    }
}
