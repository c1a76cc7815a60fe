//! Severity levels and check categories

use serde::{Deserialize, Serialize};

/// Severity of a check result
///
/// Declaration order is least to most severe; `Error` marks a semantic problem
/// found by a check, `GeneralError` marks a check that could not run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The audited state is fine
    #[default]
    Ok,
    /// Worth attention, not blocking
    Warning,
    /// A problem the check positively identified
    Error,
    /// The check itself failed to run
    GeneralError,
}

impl Severity {
    /// Get numeric value for sorting/comparison
    pub fn as_number(&self) -> u8 {
        match self {
            Severity::Ok => 0,
            Severity::Warning => 1,
            Severity::Error => 2,
            Severity::GeneralError => 3,
        }
    }

    /// Get display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Ok => "Ok",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::GeneralError => "General Error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ok" => Ok(Severity::Ok),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "generalerror" | "general-error" => Ok(Severity::GeneralError),
            _ => Err(format!(
                "Invalid severity: {s}. Use: ok, warning, error, generalerror"
            )),
        }
    }
}

/// Category of an audit check
///
/// Classification for grouping, not ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Credential hygiene, insecure endpoints
    Security,
    /// Space layout, unused or oversized resources
    Organization,
    /// Naming convention enforcement
    Naming,
    /// Deployment throughput problems
    Performance,
    /// Synthesized results for checks that failed to run
    GeneralError,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Security => "security",
            Category::Organization => "organization",
            Category::Naming => "naming",
            Category::Performance => "performance",
            Category::GeneralError => "general-error",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::GeneralError > Severity::Error);
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Ok);
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("warning".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("Error".parse::<Severity>().unwrap(), Severity::Error);
        assert!("fatal".parse::<Severity>().is_err());
    }
}
