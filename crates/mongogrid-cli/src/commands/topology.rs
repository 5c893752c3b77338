use std::path::Path;

use mongogrid_adapter::Topology;
use mongogrid_adapter::assemble::primary_template;
use mongogrid_core::PlanSpec;

pub fn show(plan_path: &Path, request_params: Option<&Path>) -> anyhow::Result<()> {
    let plan = PlanSpec::from_file(plan_path)?;
    let params = super::load_request_params(request_params)?;
    let template = primary_template(&plan)?;

    let topology = Topology::resolve(plan.plan_id()?, template.instances, &params)?;
    println!("{}", serde_json::to_string_pretty(&topology)?);
    Ok(())
}
