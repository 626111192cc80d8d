use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Role of a switch within the rack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Role {
    #[serde(rename = "TOR1")]
    Tor1,
    #[serde(rename = "TOR2")]
    Tor2,
    #[serde(rename = "BMC")]
    Bmc,
}

impl Role {
    pub const TOR_PAIR: [Role; 2] = [Role::Tor1, Role::Tor2];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Tor1 => "TOR1",
            Role::Tor2 => "TOR2",
            Role::Bmc => "BMC",
        }
    }

    /// Lowercase form used in hostnames and file names (`tor1`).
    pub fn slug(self) -> &'static str {
        match self {
            Role::Tor1 => "tor1",
            Role::Tor2 => "tor2",
            Role::Bmc => "bmc",
        }
    }

    /// The other half of the TOR pair. BMC has no peer.
    pub fn peer(self) -> Option<Role> {
        match self {
            Role::Tor1 => Some(Role::Tor2),
            Role::Tor2 => Some(Role::Tor1),
            Role::Bmc => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TOR1" => Ok(Role::Tor1),
            "TOR2" => Ok(Role::Tor2),
            "BMC" => Ok(Role::Bmc),
            _ => Err(ConfigError::InvalidRole(s.to_string())),
        }
    }
}

/// Deployment pattern: decides where storage traffic is allowed to flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentPattern {
    Switchless,
    Switched,
    FullyConverged,
}

impl DeploymentPattern {
    pub const ALL: [DeploymentPattern; 3] = [
        DeploymentPattern::Switchless,
        DeploymentPattern::Switched,
        DeploymentPattern::FullyConverged,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DeploymentPattern::Switchless => "switchless",
            DeploymentPattern::Switched => "switched",
            DeploymentPattern::FullyConverged => "fully_converged",
        }
    }
}

impl fmt::Display for DeploymentPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentPattern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeploymentPattern::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| ConfigError::InvalidPattern(s.to_string()))
    }
}

/// Identity block of a single switch (`switch` in the device document)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SwitchIdentity {
    #[schemars(schema_with = "super::formats::vendor_name")]
    pub vendor: String,
    #[schemars(length(min = 1))]
    pub model: String,
    #[serde(default)]
    pub firmware: String,
    #[schemars(length(min = 1))]
    pub hostname: String,
    pub role: Role,
    pub deployment_pattern: DeploymentPattern,
}
