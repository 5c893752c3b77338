//! Manifest assembly.
//!
//! Pure composition of everything resolved earlier in a generation into
//! the three instance groups of a MongoDB deployment:
//!
//! - `mongod_node`: the database members, sized by the topology
//! - `mongodb-config-agent`: a single agent that configures the members
//!   through Ops Manager
//! - `cleanup-service`: a one-shot errand run on teardown

use mongogrid_core::{
    ConfigError, ConfigResult, DeploymentManifest, InstanceGroup, InstanceGroupTemplate, Job,
    Lifecycle, Network, OpsManagerConfig, PlanKind, PlanSpec, Release, ServiceDeployment,
    Stemcell, UpdatePolicy,
};
use serde_json::{Map, Value, json};

use crate::carryover::Identity;
use crate::releases::ReleaseBinding;
use crate::topology::Topology;

pub use mongogrid_core::plan::OPS_MANAGER_PROPERTY;

pub const STEMCELL_ALIAS: &str = "mongodb-stemcell";

pub const MONGOD_INSTANCE_GROUP: &str = "mongod_node";
pub const MONGOD_JOB: &str = "mongod_node";

pub const CONFIG_AGENT_GROUP: &str = "mongodb-config-agent";
pub const CONFIG_AGENT_JOB: &str = "mongodb_config_agent";

pub const CLEANUP_GROUP: &str = "cleanup-service";
pub const CLEANUP_JOB: &str = "cleanup_service";

/// Everything a manifest is composed from.
pub struct ManifestInputs<'a> {
    pub deployment: &'a ServiceDeployment,
    pub plan: &'a PlanSpec,
    pub plan_kind: PlanKind,
    pub ops: &'a OpsManagerConfig,
    pub topology: Topology,
    /// Binding for the `mongod_node` job.
    pub mongod: &'a ReleaseBinding,
    /// Binding for the config agent job; the cleanup errand ships in the same release.
    pub config_agent: &'a ReleaseBinding,
    pub identity: &'a Identity,
    pub group_id: &'a str,
    /// Agent key issued with the freshly created group.
    pub agent_api_key: &'a str,
    pub auth_key: &'a str,
    pub engine_version: &'a str,
    pub update: UpdatePolicy,
}

/// The plan's `mongod_node` template. It must exist and declare at least one network.
pub fn primary_template(plan: &PlanSpec) -> ConfigResult<&InstanceGroupTemplate> {
    let template = plan
        .find_instance_group(MONGOD_INSTANCE_GROUP)
        .ok_or_else(|| ConfigError::MissingInstanceGroup(MONGOD_INSTANCE_GROUP.to_string()))?;
    if template.networks.is_empty() {
        return Err(ConfigError::NoNetworks(MONGOD_INSTANCE_GROUP.to_string()));
    }
    Ok(template)
}

pub fn assemble(inputs: &ManifestInputs<'_>) -> ConfigResult<DeploymentManifest> {
    let template = primary_template(inputs.plan)?;
    let networks: Vec<Network> = template
        .networks
        .iter()
        .map(|name| Network { name: name.clone() })
        .collect();

    let releases = inputs
        .deployment
        .releases
        .iter()
        .map(|r| Release {
            name: r.name.clone(),
            version: r.version.clone(),
        })
        .collect();

    let mongod_job = Job::new(MONGOD_JOB, &inputs.mongod.release)
        .provides(MONGOD_JOB)
        .consumes(MONGOD_JOB)
        .consumes(CONFIG_AGENT_JOB);

    let agent_job = Job::new(CONFIG_AGENT_JOB, &inputs.config_agent.release)
        .provides(CONFIG_AGENT_JOB)
        .consumes(MONGOD_JOB);

    let cleanup_job =
        Job::new(CLEANUP_JOB, &inputs.config_agent.release).consumes(CONFIG_AGENT_JOB);

    let mongod = InstanceGroup {
        instances: inputs.topology.instances,
        jobs: vec![mongod_job],
        persistent_disk_type: template.persistent_disk_type.clone(),
        ..singleton_group(MONGOD_INSTANCE_GROUP, template, &networks)
    };

    let config_agent = InstanceGroup {
        jobs: vec![agent_job],
        properties: ops_properties(agent_properties(inputs)),
        ..singleton_group(CONFIG_AGENT_GROUP, template, &networks)
    };

    let cleanup = InstanceGroup {
        jobs: vec![cleanup_job],
        lifecycle: Some(Lifecycle::Errand),
        ..singleton_group(CLEANUP_GROUP, template, &networks)
    };

    Ok(DeploymentManifest {
        name: inputs.deployment.deployment_name.clone(),
        releases,
        stemcells: vec![Stemcell {
            alias: STEMCELL_ALIAS.to_string(),
            os: inputs.deployment.stemcell.os.clone(),
            version: inputs.deployment.stemcell.version.clone(),
        }],
        instance_groups: vec![mongod, config_agent, cleanup],
        update: inputs.update.clone(),
        properties: ops_properties(binding_properties(inputs)),
    })
}

/// A one-instance service group inheriting VM and network settings from the template.
fn singleton_group(
    name: &str,
    template: &InstanceGroupTemplate,
    networks: &[Network],
) -> InstanceGroup {
    InstanceGroup {
        name: name.to_string(),
        instances: 1,
        jobs: Vec::new(),
        vm_type: template.vm_type.clone(),
        vm_extensions: template.vm_extensions.clone(),
        stemcell: STEMCELL_ALIAS.to_string(),
        persistent_disk_type: None,
        azs: template.azs.clone(),
        networks: networks.to_vec(),
        lifecycle: Some(Lifecycle::Service),
        properties: Map::new(),
    }
}

fn ops_properties(block: Value) -> Map<String, Value> {
    let mut props = Map::new();
    props.insert(OPS_MANAGER_PROPERTY.to_string(), block);
    props
}

// Consumed by the mongodb_config_agent job.
fn agent_properties(inputs: &ManifestInputs<'_>) -> Value {
    json!({
        "id": inputs.identity.identifier,
        "url": inputs.ops.url,
        "agent_api_key": inputs.agent_api_key,
        "api_key": inputs.ops.api_key,
        "auth_key": inputs.auth_key,
        "username": inputs.ops.username,
        "group_id": inputs.group_id,
        "plan_id": inputs.plan_kind.as_str(),
        "admin_password": inputs.identity.admin_password,
        "engine_version": inputs.engine_version,
        "routers": inputs.topology.routers,
        "config_servers": inputs.topology.config_servers,
        "replicas": inputs.topology.replicas,
    })
}

// Read back by the binding and credential collaborators.
fn binding_properties(inputs: &ManifestInputs<'_>) -> Value {
    json!({
        "url": inputs.ops.url,
        "api_key": inputs.agent_api_key,
        "group_id": inputs.group_id,
        "admin_password": inputs.identity.admin_password,
        "plan_id": inputs.plan_kind.as_str(),
        "routers": inputs.topology.routers,
        "config_servers": inputs.topology.config_servers,
        "replicas": inputs.topology.replicas,
    })
}
