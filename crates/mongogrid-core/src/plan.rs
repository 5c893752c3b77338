//! Plan definitions: topology shape, Ops Manager settings, and instance
//! group templates authored by the operator.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, ConfigResult};

/// Property key holding the Ops Manager block in plan properties.
pub const OPS_MANAGER_PROPERTY: &str = "mongo_ops";

/// Property key holding the plan identifier in plan properties.
pub const PLAN_ID_PROPERTY: &str = "id";

/// Topology shape offered by a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    Standalone,
    ReplicaSet,
    ShardedCluster,
}

impl PlanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanKind::Standalone => "standalone",
            PlanKind::ReplicaSet => "replica_set",
            PlanKind::ShardedCluster => "sharded_cluster",
        }
    }
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standalone" => Ok(PlanKind::Standalone),
            "replica_set" => Ok(PlanKind::ReplicaSet),
            "sharded_cluster" => Ok(PlanKind::ShardedCluster),
            other => Err(ConfigError::UnknownPlan(other.to_string())),
        }
    }
}

/// A service plan as configured by the operator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlanSpec {
    /// Free-form plan properties (`id`, `mongo_ops`, ...).
    #[serde(default)]
    pub properties: serde_json::Map<String, Value>,
    /// Declared instance group templates.
    #[serde(default)]
    pub instance_groups: Vec<InstanceGroupTemplate>,
}

/// Operator-declared template for one instance group.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InstanceGroupTemplate {
    pub name: String,
    /// Declared instance count.
    pub instances: u32,
    pub vm_type: String,
    #[serde(default)]
    pub vm_extensions: Vec<String>,
    #[serde(default)]
    pub persistent_disk_type: Option<String>,
    #[serde(default)]
    pub azs: Vec<String>,
    #[serde(default)]
    pub networks: Vec<String>,
}

/// A tag declared on the plan, propagated to the external group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanTag {
    pub tag_name: String,
}

/// Typed view of the plan's `mongo_ops` block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpsManagerConfig {
    /// Base URL of the Ops Manager API, without a trailing `/`.
    pub url: String,
    pub username: String,
    pub api_key: String,
    #[serde(default)]
    pub tags: Option<Vec<PlanTag>>,
}

impl OpsManagerConfig {
    /// Display names of all declared tags, in declaration order.
    pub fn tag_names(&self) -> Vec<String> {
        self.tags
            .iter()
            .flatten()
            .map(|t| t.tag_name.clone())
            .collect()
    }
}

impl PlanSpec {
    /// Load a plan from a `.json` or `.toml` file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            _ => serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Raw plan identifier as declared in the plan properties.
    pub fn plan_id(&self) -> ConfigResult<&str> {
        match self.properties.get(PLAN_ID_PROPERTY) {
            Some(Value::String(id)) => Ok(id),
            Some(_) => Err(ConfigError::InvalidPlanProperty {
                field: PLAN_ID_PROPERTY.to_string(),
                reason: "expected a string".to_string(),
            }),
            None => Err(ConfigError::MissingPlanProperty(PLAN_ID_PROPERTY.to_string())),
        }
    }

    /// Parsed plan kind. Unknown identifiers are a fatal configuration error.
    pub fn kind(&self) -> ConfigResult<PlanKind> {
        self.plan_id()?.parse()
    }

    /// Decode the `mongo_ops` block, stripping trailing `/` from the URL.
    pub fn ops_manager(&self) -> ConfigResult<OpsManagerConfig> {
        let raw = self
            .properties
            .get(OPS_MANAGER_PROPERTY)
            .ok_or_else(|| ConfigError::MissingPlanProperty(OPS_MANAGER_PROPERTY.to_string()))?;

        let mut config: OpsManagerConfig =
            serde_json::from_value(raw.clone()).map_err(|e| ConfigError::InvalidPlanProperty {
                field: OPS_MANAGER_PROPERTY.to_string(),
                reason: e.to_string(),
            })?;
        config.url = config.url.trim_end_matches('/').to_string();
        Ok(config)
    }

    pub fn find_instance_group(&self, name: &str) -> Option<&InstanceGroupTemplate> {
        self.instance_groups.iter().find(|ig| ig.name == name)
    }
}
