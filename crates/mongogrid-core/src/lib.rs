pub mod deployment;
pub mod error;
pub mod manifest;
pub mod params;
pub mod plan;

pub use deployment::{ServiceDeployment, ServiceRelease, StemcellRef};
pub use error::{ConfigError, ConfigResult};
pub use manifest::*;
pub use params::RequestParameters;
pub use plan::{InstanceGroupTemplate, OpsManagerConfig, PlanKind, PlanSpec, PlanTag};
