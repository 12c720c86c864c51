//! Default element type for untyped input.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Scalar set element: integers compare numerically and sort before text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Atom {
    Int(i64),
    Text(String),
}

impl FromStr for Atom {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(value) => Atom::Int(value),
            Err(_) => Atom::Text(s.to_string()),
        })
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Int(value) => write!(f, "{}", value),
            Atom::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for Atom {
    fn from(value: i64) -> Self {
        Atom::Int(value)
    }
}

impl From<&str> for Atom {
    fn from(value: &str) -> Self {
        Atom::Text(value.to_string())
    }
}
