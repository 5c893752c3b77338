//! Generated deployment manifest schema.
//!
//! A manifest is the complete specification handed to the deployment
//! director: releases, stemcells, instance groups, and the rollout policy.
//! Previous manifests are read back in using the same types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigResult};

// ── Manifest ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeploymentManifest {
    pub name: String,
    pub releases: Vec<Release>,
    pub stemcells: Vec<Stemcell>,
    pub instance_groups: Vec<InstanceGroup>,
    pub update: UpdatePolicy,
    /// Top-level properties consumed by binding collaborators.
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Release {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stemcell {
    pub alias: String,
    pub os: String,
    pub version: String,
}

// ── Instance groups ───────────────────────────────────────────────

/// A named, horizontally-sized set of homogeneous instances.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstanceGroup {
    pub name: String,
    pub instances: u32,
    pub jobs: Vec<Job>,
    pub vm_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vm_extensions: Vec<String>,
    /// Stemcell alias.
    pub stemcell: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_disk_type: Option<String>,
    #[serde(default)]
    pub azs: Vec<String>,
    pub networks: Vec<Network>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<Lifecycle>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Network {
    pub name: String,
}

/// Whether an instance group runs a persistent process or a one-shot task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Service,
    Errand,
}

/// A job bound to the release that provides it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Job {
    pub name: String,
    pub release: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub provides: BTreeMap<String, ProvidesLink>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub consumes: BTreeMap<String, ConsumesLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProvidesLink {
    #[serde(rename = "as")]
    pub alias: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsumesLink {
    pub from: String,
}

impl Job {
    pub fn new(name: &str, release: &str) -> Self {
        Self {
            name: name.to_string(),
            release: release.to_string(),
            provides: BTreeMap::new(),
            consumes: BTreeMap::new(),
        }
    }

    /// Declare a provided link published under its own name.
    pub fn provides(mut self, link: &str) -> Self {
        self.provides.insert(
            link.to_string(),
            ProvidesLink {
                alias: link.to_string(),
            },
        );
        self
    }

    /// Declare a consumed link resolved from the provider of the same name.
    pub fn consumes(mut self, link: &str) -> Self {
        self.consumes.insert(
            link.to_string(),
            ConsumesLink {
                from: link.to_string(),
            },
        );
        self
    }
}

// ── Rollout policy ────────────────────────────────────────────────

/// How the director rolls an updated manifest out across instances.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdatePolicy {
    /// Number of canary instances updated first.
    pub canaries: u32,
    pub canary_watch_time: WatchTime,
    pub update_watch_time: WatchTime,
    /// Maximum number of instances updated concurrently.
    pub max_in_flight: u32,
}

impl Default for UpdatePolicy {
    fn default() -> Self {
        Self {
            canaries: 1,
            canary_watch_time: WatchTime::new(3000, 180_000),
            update_watch_time: WatchTime::new(3000, 180_000),
            max_in_flight: 4,
        }
    }
}

/// A watch-time window in milliseconds, written as `min-max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WatchTime {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl WatchTime {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }
}

impl fmt::Display for WatchTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min_ms, self.max_ms)
    }
}

impl FromStr for WatchTime {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::Parse(format!("invalid watch time: {s}"));
        let (min, max) = s.split_once('-').ok_or_else(invalid)?;
        let min_ms = min.trim().parse().map_err(|_| invalid())?;
        let max_ms = max.trim().parse().map_err(|_| invalid())?;
        if min_ms > max_ms {
            return Err(invalid());
        }
        Ok(Self { min_ms, max_ms })
    }
}

impl TryFrom<String> for WatchTime {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WatchTime> for String {
    fn from(value: WatchTime) -> Self {
        value.to_string()
    }
}

impl DeploymentManifest {
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn find_instance_group(&self, name: &str) -> Option<&InstanceGroup> {
        self.instance_groups.iter().find(|ig| ig.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_update_policy() {
        let policy = UpdatePolicy::default();
        assert_eq!(policy.canaries, 1);
        assert_eq!(policy.max_in_flight, 4);
        assert_eq!(policy.canary_watch_time.to_string(), "3000-180000");
        assert_eq!(policy.update_watch_time, policy.canary_watch_time);
    }

    #[test]
    fn watch_time_serializes_as_range_string() {
        let json = serde_json::to_value(UpdatePolicy::default()).unwrap();
        assert_eq!(json["canary_watch_time"], "3000-180000");
        assert_eq!(json["update_watch_time"], "3000-180000");
    }

    #[test]
    fn rejects_malformed_watch_time() {
        assert!("3000".parse::<WatchTime>().is_err());
        assert!("a-b".parse::<WatchTime>().is_err());
        assert!("500-100".parse::<WatchTime>().is_err());
        assert_eq!(
            "1000-2000".parse::<WatchTime>().unwrap(),
            WatchTime::new(1000, 2000)
        );
    }

    #[test]
    fn job_links_use_bosh_key_names() {
        let job = Job::new("mongod_node", "mongodb")
            .provides("mongod_node")
            .consumes("mongodb_config_agent");
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["provides"]["mongod_node"]["as"], "mongod_node");
        assert_eq!(
            json["consumes"]["mongodb_config_agent"]["from"],
            "mongodb_config_agent"
        );
    }

    #[test]
    fn job_without_links_omits_link_sections() {
        let json = serde_json::to_value(Job::new("cleanup_service", "mongodb")).unwrap();
        assert!(json.get("provides").is_none());
        assert!(json.get("consumes").is_none());
    }

    #[test]
    fn lifecycle_is_snake_case() {
        assert_eq!(serde_json::to_value(Lifecycle::Errand).unwrap(), "errand");
        assert_eq!(serde_json::to_value(Lifecycle::Service).unwrap(), "service");
        let decoded: Lifecycle = serde_json::from_str(r#""service""#).unwrap();
        assert_eq!(decoded, Lifecycle::Service);
    }
}
