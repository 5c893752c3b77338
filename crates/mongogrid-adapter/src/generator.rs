//! Manifest generator — one generation call, end to end.
//!
//! Every pure check (plan kind, primary template, release bindings,
//! previous manifest fields) runs before the first external call, so a
//! configuration error never touches the Ops Manager group. External calls
//! run strictly in order: delete previous group, create group, then the
//! optional engine version lookup.

use mongogrid_core::{
    DeploymentManifest, PlanSpec, RequestParameters, ServiceDeployment, UpdatePolicy,
};
use mongogrid_opsmanager::{DesiredGroup, GroupApi, GroupReconciler};
use tracing::{debug, info};

use crate::assemble::{self, CONFIG_AGENT_JOB, MONGOD_JOB, ManifestInputs};
use crate::carryover::{self, PreviousState};
use crate::error::GenerateResult;
use crate::releases::resolve_jobs;
use crate::secrets::{AUTH_KEY_LENGTH, SecretGenerator};
use crate::topology::{ShardedDefaults, Topology};

/// Inputs to one generation call. All of them are read-only.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub deployment: &'a ServiceDeployment,
    pub plan: &'a PlanSpec,
    pub params: &'a RequestParameters,
    /// The last successfully generated manifest, absent on first provisioning.
    pub previous_manifest: Option<&'a DeploymentManifest>,
}

pub struct ManifestGenerator<'a> {
    secrets: &'a dyn SecretGenerator,
    update: UpdatePolicy,
    sharded_defaults: ShardedDefaults,
}

impl<'a> ManifestGenerator<'a> {
    pub fn new(secrets: &'a dyn SecretGenerator) -> Self {
        Self {
            secrets,
            update: UpdatePolicy::default(),
            sharded_defaults: ShardedDefaults::default(),
        }
    }

    pub fn with_update_policy(mut self, update: UpdatePolicy) -> Self {
        self.update = update;
        self
    }

    pub fn with_sharded_defaults(mut self, defaults: ShardedDefaults) -> Self {
        self.sharded_defaults = defaults;
        self
    }

    /// Generate a complete manifest, replacing the cluster's external group.
    ///
    /// All or nothing: any error aborts before a manifest is produced. An
    /// error from the group API leaves external state as the failed call
    /// left it.
    pub fn generate(
        &self,
        request: GenerationRequest<'_>,
        api: &dyn GroupApi,
    ) -> GenerateResult<DeploymentManifest> {
        let GenerationRequest {
            deployment,
            plan,
            params,
            previous_manifest,
        } = request;
        debug!(?params, "request parameters");

        let plan_kind = plan.kind()?;
        let ops = plan.ops_manager()?;
        let template = assemble::primary_template(plan)?;
        let topology =
            Topology::for_kind(plan_kind, template.instances, params, &self.sharded_defaults);
        info!(
            plan = %plan_kind,
            instances = topology.instances,
            replicas = topology.replicas,
            config_servers = topology.config_servers,
            routers = topology.routers,
            "resolved topology"
        );

        let bindings = resolve_jobs(&deployment.releases, &[MONGOD_JOB, CONFIG_AGENT_JOB])?;
        let (mongod, config_agent) = (&bindings[0], &bindings[1]);

        let previous = previous_manifest
            .map(PreviousState::from_manifest)
            .transpose()?;

        let identity = carryover::carry(previous.as_ref(), self.secrets)?;
        let auth_key = self.secrets.generate(AUTH_KEY_LENGTH)?;

        let desired = DesiredGroup {
            identifier: identity.identifier.clone(),
            name: params.project_name.clone(),
            org_id: params.org_id.clone(),
            tags: ops.tag_names(),
        };
        let group = GroupReconciler::new(api)
            .reconcile(&desired, previous.as_ref().map(|p| p.group_id.as_str()))?;

        let engine_version = match &params.version {
            Some(version) => version.clone(),
            None => {
                let latest = api.latest_engine_version(&group.id);
                debug!(group_id = %group.id, version = %latest, "using latest engine version");
                latest
            }
        };

        let manifest = assemble::assemble(&ManifestInputs {
            deployment,
            plan,
            plan_kind,
            ops: &ops,
            topology,
            mongod,
            config_agent,
            identity: &identity,
            group_id: &group.id,
            agent_api_key: &group.agent_api_key,
            auth_key: &auth_key,
            engine_version: &engine_version,
            update: self.update.clone(),
        })?;

        debug!(
            name = %manifest.name,
            instance_groups = manifest.instance_groups.len(),
            "generated manifest"
        );
        Ok(manifest)
    }
}
