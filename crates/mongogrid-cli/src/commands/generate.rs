use std::path::PathBuf;
use std::time::Duration;

use mongogrid_adapter::{GenerationRequest, ManifestGenerator, OsSecretGenerator};
use mongogrid_core::{DeploymentManifest, PlanSpec, ServiceDeployment};
use mongogrid_opsmanager::OpsManagerClient;
use tracing::info;

pub struct GenerateArgs {
    pub deployment: PathBuf,
    pub plan: PathBuf,
    pub request_params: Option<PathBuf>,
    pub previous_manifest: Option<PathBuf>,
    pub timeout_secs: u64,
}

pub fn generate_manifest(args: &GenerateArgs) -> anyhow::Result<()> {
    let deployment = ServiceDeployment::from_file(&args.deployment)?;
    let plan = PlanSpec::from_file(&args.plan)?;
    let params = super::load_request_params(args.request_params.as_deref())?;
    let previous = match &args.previous_manifest {
        Some(path) => Some(DeploymentManifest::from_json(&std::fs::read_to_string(path)?)?),
        None => None,
    };

    let ops = plan.ops_manager()?;
    let client = OpsManagerClient::with_timeout(&ops, Duration::from_secs(args.timeout_secs))?;

    let secrets = OsSecretGenerator;
    let manifest = ManifestGenerator::new(&secrets).generate(
        GenerationRequest {
            deployment: &deployment,
            plan: &plan,
            params: &params,
            previous_manifest: previous.as_ref(),
        },
        &client,
    )?;

    info!(deployment = %manifest.name, "manifest generated");
    println!("{}", serde_json::to_string_pretty(&manifest)?);
    Ok(())
}
