use std::{fmt, str::FromStr};

use crate::{ModelError, SPACE_CLAIM_PARAMETERS_KIND};

/// Parameter object kinds understood by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    SpaceClaimParameters,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::SpaceClaimParameters => SPACE_CLAIM_PARAMETERS_KIND,
        }
    }
}

impl FromStr for ParameterKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            SPACE_CLAIM_PARAMETERS_KIND => Ok(ParameterKind::SpaceClaimParameters),
            other => Err(ModelError::UnknownParameterKind(other.to_string())),
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_kind() {
        let kind: ParameterKind = "SpaceClaimParameters".parse().unwrap();
        assert_eq!(kind, ParameterKind::SpaceClaimParameters);
        assert_eq!(kind.to_string(), "SpaceClaimParameters");
    }

    #[test]
    fn kind_match_is_case_sensitive() {
        for bad in ["spaceclaimparameters", "ConfigMap", ""] {
            let err = bad.parse::<ParameterKind>().unwrap_err();
            assert!(matches!(err, ModelError::UnknownParameterKind(k) if k == bad));
        }
    }
}
