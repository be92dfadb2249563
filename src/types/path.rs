//! Immutable segment paths locating a value or an error inside a nested form.
//!
//! A [`Path`] is an ordered list of non-empty, slash-free segments. It is
//! rendered as `/a/b` and the empty path (the root) as `/`.
//!
//! # Examples
//!
//! ```
//! use form_rail::types::Path;
//!
//! let parsed = Path::parse("/details/option").unwrap();
//! let built = Path::new(["details", "option"]).unwrap();
//! assert_eq!(parsed, built);
//! assert!(parsed.includes(&Path::new(["details"]).unwrap()));
//! assert_eq!(parsed.to_string(), "/details/option");
//! ```
use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error raised when a path cannot be built from its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A single path string did not match `segment(/segment)*`.
    Malformed { input: String },
    /// One of several segments was empty.
    EmptySegment,
    /// One of several segments contained a `/`.
    SegmentContainsSlash { segment: String },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { input } => write!(f, "path {} is incorrect", input),
            Self::EmptySegment => f.write_str("path segment must not be empty"),
            Self::SegmentContainsSlash { segment } => {
                write!(f, "path segment {} must not contain char '/'", segment)
            },
        }
    }
}

impl std::error::Error for PathError {}

/// Ordered sequence of segments identifying a location in a value tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    parts: Vec<String>,
}

impl Path {
    /// The empty path, addressing the root of a value.
    #[inline]
    pub fn root() -> Self {
        Self { parts: Vec::new() }
    }

    /// Builds a path from individual segments.
    ///
    /// Each segment must be non-empty and free of `/`.
    pub fn new<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parts = segments
            .into_iter()
            .map(|segment| {
                let segment = segment.into();
                if segment.is_empty() {
                    Err(PathError::EmptySegment)
                } else if segment.contains('/') {
                    Err(PathError::SegmentContainsSlash { segment })
                } else {
                    Ok(segment)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { parts })
    }

    /// Parses a slash-delimited path such as `first_name` or `/details/option`.
    ///
    /// A single leading slash is accepted; empty segments (`a//b`, `//`,
    /// trailing `/`) and the empty string are rejected.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let malformed = || PathError::Malformed { input: input.to_string() };
        let body = input.strip_prefix('/').unwrap_or(input);

        if body.is_empty() {
            return Err(malformed());
        }

        let parts = body
            .split('/')
            .map(|segment| if segment.is_empty() { Err(malformed()) } else { Ok(segment.to_string()) })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { parts })
    }

    /// Returns the segments of this path.
    #[inline]
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Returns `true` for the root path.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parts.is_empty()
    }

    /// Number of segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Same as [`Path::is_root`].
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.is_root()
    }

    /// Concatenates `other` after this path.
    #[must_use]
    pub fn plus(&self, other: &Path) -> Path {
        let mut parts = Vec::with_capacity(self.parts.len() + other.parts.len());
        parts.extend(self.parts.iter().cloned());
        parts.extend(other.parts.iter().cloned());
        Path { parts }
    }

    /// Returns `true` if `prefix` is a positional prefix of this path.
    ///
    /// Every path includes the root path and itself.
    pub fn includes(&self, prefix: &Path) -> bool {
        prefix.parts.len() <= self.parts.len()
            && prefix.parts.iter().zip(&self.parts).all(|(a, b)| a == b)
    }

    /// Single-segment path built from a control key.
    pub(crate) fn key(key: &str) -> Result<Self, PathError> {
        Self::new([key])
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parts.is_empty() {
            return f.write_str("/");
        }
        for part in &self.parts {
            write!(f, "/{}", part)?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Path {
    type Error = PathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

#[cfg(feature = "serde")]
impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == "/" {
            return Ok(Path::root());
        }
        Path::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Builds a [`Path`](crate::types::Path), returning `Result<Path, PathError>`.
///
/// With one argument the string is parsed as a slash-delimited path; with
/// several, each argument is a single segment.
///
/// ```
/// use form_rail::path;
///
/// assert_eq!(path!("/my/path").unwrap(), path!("my", "path").unwrap());
/// assert!(path!("//").is_err());
/// ```
#[macro_export]
macro_rules! path {
    () => {
        ::core::result::Result::<$crate::types::Path, $crate::types::PathError>::Ok(
            $crate::types::Path::root(),
        )
    };
    ($single:expr $(,)?) => {
        $crate::types::Path::parse($single)
    };
    ($($segment:expr),+ $(,)?) => {
        $crate::types::Path::new([$($segment),+])
    };
}
