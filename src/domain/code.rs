use std::{borrow::Borrow, fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;

/// A validated course code, such as `CS101` or `MATH-205`.
///
/// Codes are non-empty and contain no whitespace. They are compared exactly;
/// normalisation (for example upper-casing user input) happens at the CLI
/// boundary, not here.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CourseCode(NonEmptyString);

impl CourseCode {
    /// Creates a new `CourseCode` from a string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCodeError` if the string is empty or contains
    /// whitespace.
    pub fn new(s: String) -> Result<Self, InvalidCodeError> {
        if s.chars().any(char::is_whitespace) {
            return Err(InvalidCodeError(s));
        }

        NonEmptyString::new(s).map(Self).map_err(InvalidCodeError)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for CourseCode {
    type Error = InvalidCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for CourseCode {
    type Error = InvalidCodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl FromStr for CourseCode {
    type Err = InvalidCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for CourseCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl serde::Serialize for CourseCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl AsRef<str> for CourseCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for CourseCode {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl Deref for CourseCode {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a string is not a valid course code.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid course code '{0}': must be non-empty and contain no whitespace")]
pub struct InvalidCodeError(String);
