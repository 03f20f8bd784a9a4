//! Box coordinate encodings

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the four coordinates of a [`BBox`](super::BBox) are to be read.
///
/// The format is always passed explicitly; it is never guessed from the values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxFormat {
    /// `(x1, y1, x2, y2)`
    #[default]
    Corners,
    /// `(cx, cy, w, h)`
    Midpoint,
}

impl BoxFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoxFormat::Corners => "corners",
            BoxFormat::Midpoint => "midpoint",
        }
    }
}

impl FromStr for BoxFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "corners" => Ok(BoxFormat::Corners),
            "midpoint" => Ok(BoxFormat::Midpoint),
            other => Err(Error::invalid(format!(
                "unrecognized box format '{other}' (expected 'corners' or 'midpoint')"
            ))),
        }
    }
}

impl fmt::Display for BoxFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        assert_eq!("corners".parse::<BoxFormat>(), Ok(BoxFormat::Corners));
        assert_eq!(" Midpoint ".parse::<BoxFormat>(), Ok(BoxFormat::Midpoint));
    }

    #[test]
    fn test_unknown_format_is_invalid_argument() {
        let err = "mindpoint".parse::<BoxFormat>().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&BoxFormat::Midpoint).unwrap();
        assert_eq!(json, "\"midpoint\"");
        let back: BoxFormat = serde_json::from_str("\"corners\"").unwrap();
        assert_eq!(back, BoxFormat::Corners);
    }
}
