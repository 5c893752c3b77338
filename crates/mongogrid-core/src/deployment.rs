//! Deployment-level inputs supplied by the broker for each generation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// The deployment being generated: its name, stemcell, and release catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceDeployment {
    pub deployment_name: String,
    pub releases: Vec<ServiceRelease>,
    pub stemcell: StemcellRef,
}

/// A deployable release artifact and the job names it provides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceRelease {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub jobs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StemcellRef {
    pub os: String,
    pub version: String,
}

impl ServiceDeployment {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

impl ServiceRelease {
    pub fn provides(&self, job: &str) -> bool {
        self.jobs.iter().any(|j| j == job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_deployment_json() {
        let json = r#"{
            "deployment_name": "service-instance_1234",
            "releases": [
                {
                    "name": "mongodb",
                    "version": "0.9.1",
                    "jobs": ["mongod_node", "mongodb_config_agent"]
                }
            ],
            "stemcell": { "os": "ubuntu-jammy", "version": "1.200" }
        }"#;
        let deployment: ServiceDeployment = serde_json::from_str(json).unwrap();
        assert_eq!(deployment.deployment_name, "service-instance_1234");
        assert!(deployment.releases[0].provides("mongod_node"));
        assert!(!deployment.releases[0].provides("cleanup_service"));
        assert_eq!(deployment.stemcell.os, "ubuntu-jammy");
    }
}
