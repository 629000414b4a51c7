#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Final classification of one evaluated submission.
///
/// Every submission receives exactly one verdict; there is no "unknown"
/// state. When the `sea-orm` feature is enabled, this enum can be used
/// directly as an entity column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "PascalCase")]
pub enum Verdict {
    /// Every test case produced the expected output.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Accepted"))]
    Accepted,
    /// At least one test case produced a mismatching output.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "WrongAnswer"))]
    WrongAnswer,
    /// The submitted code raised an error while running a test case.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "RuntimeError"))]
    RuntimeError,
    /// The submitted code could not be parsed or compiled.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "CompilationError"))]
    CompilationError,
    /// A test case exceeded its wall-clock budget.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "TimeLimitExceeded"))]
    TimeLimitExceeded,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// All possible verdict values.
    pub const ALL: &'static [Verdict] = &[
        Self::Accepted,
        Self::WrongAnswer,
        Self::RuntimeError,
        Self::CompilationError,
        Self::TimeLimitExceeded,
    ];

    /// Returns the string representation (PascalCase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "Accepted",
            Self::WrongAnswer => "WrongAnswer",
            Self::RuntimeError => "RuntimeError",
            Self::CompilationError => "CompilationError",
            Self::TimeLimitExceeded => "TimeLimitExceeded",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid verdict string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVerdictError {
    invalid: String,
}

impl fmt::Display for ParseVerdictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid verdict '{}'. Valid values: {}",
            self.invalid,
            Verdict::ALL
                .iter()
                .map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseVerdictError {}

impl FromStr for Verdict {
    type Err = ParseVerdictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Accepted" => Ok(Self::Accepted),
            "WrongAnswer" => Ok(Self::WrongAnswer),
            "RuntimeError" => Ok(Self::RuntimeError),
            "CompilationError" => Ok(Self::CompilationError),
            "TimeLimitExceeded" => Ok(Self::TimeLimitExceeded),
            _ => Err(ParseVerdictError {
                invalid: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip() {
        for verdict in Verdict::ALL {
            let json = serde_json::to_string(verdict).unwrap();
            let parsed: Verdict = serde_json::from_str(&json).unwrap();
            assert_eq!(*verdict, parsed);
        }
    }

    #[test]
    fn from_str_accepts_known_values() {
        assert_eq!("Accepted".parse::<Verdict>().unwrap(), Verdict::Accepted);
        assert_eq!(
            "TimeLimitExceeded".parse::<Verdict>().unwrap(),
            Verdict::TimeLimitExceeded
        );
        assert!("Judged".parse::<Verdict>().is_err());
    }

    #[test]
    fn display_matches_serde() {
        let json = serde_json::to_string(&Verdict::WrongAnswer).unwrap();
        assert_eq!(json, format!("\"{}\"", Verdict::WrongAnswer));
    }
}
