//! Topology resolution — how many instances each plan kind needs.
//!
//! ```text
//! standalone:      template instance count (one)
//! replica_set:     replicas override, else template instance count
//! sharded_cluster: shards * replicas + config_servers + routers
//! ```

use mongogrid_core::{ConfigResult, PlanKind, RequestParameters};
use serde::{Deserialize, Serialize};

/// Instance counts for one generation.
///
/// Role counts are zero for plans that are not sharded. Shards only feed
/// into `instances` and are not recorded separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// Total instances in the primary `mongod_node` group.
    pub instances: u32,
    pub replicas: u32,
    pub config_servers: u32,
    pub routers: u32,
}

/// Role counts used for sharded clusters when the caller does not override them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardedDefaults {
    pub shards: u32,
    pub replicas: u32,
    pub config_servers: u32,
    pub routers: u32,
}

impl Default for ShardedDefaults {
    fn default() -> Self {
        Self {
            shards: 2,
            replicas: 3,
            config_servers: 3,
            routers: 2,
        }
    }
}

impl Topology {
    /// Resolve the topology for a raw plan identifier.
    pub fn resolve(
        plan_id: &str,
        template_instances: u32,
        params: &RequestParameters,
    ) -> ConfigResult<Self> {
        let kind: PlanKind = plan_id.parse()?;
        Ok(Self::for_kind(kind, template_instances, params, &ShardedDefaults::default()))
    }

    /// Resolve the topology for a known plan kind.
    ///
    /// `template_instances` is the instance count declared on the plan's
    /// primary instance group template.
    pub fn for_kind(
        kind: PlanKind,
        template_instances: u32,
        params: &RequestParameters,
        defaults: &ShardedDefaults,
    ) -> Self {
        match kind {
            PlanKind::Standalone => Self::single(template_instances),
            PlanKind::ReplicaSet => Self::single(params.replicas.unwrap_or(template_instances)),
            PlanKind::ShardedCluster => {
                let shards = params.shards.unwrap_or(defaults.shards);
                let replicas = params.replicas.unwrap_or(defaults.replicas);
                let config_servers = params.config_servers.unwrap_or(defaults.config_servers);
                let routers = params.mongos.unwrap_or(defaults.routers);

                let instances = shards
                    .saturating_mul(replicas)
                    .saturating_add(config_servers)
                    .saturating_add(routers);

                Self {
                    instances,
                    replicas,
                    config_servers,
                    routers,
                }
            }
        }
    }

    fn single(instances: u32) -> Self {
        Self {
            instances,
            replicas: 0,
            config_servers: 0,
            routers: 0,
        }
    }
}
