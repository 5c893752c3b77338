//! Identity and credential carry-over between generations.
//!
//! The stable identifier and the admin password are minted once, on first
//! provisioning, and then read back from the previous manifest forever.
//! Running cluster members depend on both, so they are never regenerated
//! while a previous manifest exists.

use mongogrid_core::{ConfigError, ConfigResult, DeploymentManifest};
use serde_json::{Map, Value};

use crate::assemble::{CONFIG_AGENT_GROUP, OPS_MANAGER_PROPERTY};
use crate::error::SecretError;
use crate::secrets::{ADMIN_PASSWORD_LENGTH, IDENTIFIER_LENGTH, SecretGenerator};

/// State recorded in the previous manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviousState {
    pub identifier: String,
    pub admin_password: String,
    /// External group the previous manifest was generated against.
    pub group_id: String,
}

/// Long-lived credentials for one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub identifier: String,
    pub admin_password: String,
}

impl PreviousState {
    /// Read the recorded state from the config agent's properties.
    pub fn from_manifest(manifest: &DeploymentManifest) -> ConfigResult<Self> {
        let group = manifest.find_instance_group(CONFIG_AGENT_GROUP).ok_or_else(|| {
            ConfigError::MalformedPreviousManifest {
                field: format!("instance_groups.{CONFIG_AGENT_GROUP}"),
            }
        })?;
        let props = group
            .properties
            .get(OPS_MANAGER_PROPERTY)
            .and_then(Value::as_object)
            .ok_or_else(|| ConfigError::MalformedPreviousManifest {
                field: OPS_MANAGER_PROPERTY.to_string(),
            })?;

        Ok(Self {
            identifier: string_field(props, "id")?,
            admin_password: string_field(props, "admin_password")?,
            group_id: string_field(props, "group_id")?,
        })
    }
}

fn string_field(props: &Map<String, Value>, name: &str) -> ConfigResult<String> {
    props
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ConfigError::MalformedPreviousManifest {
            field: format!("{OPS_MANAGER_PROPERTY}.{name}"),
        })
}

/// Reuse the previous identity verbatim, or mint a new one.
pub fn carry(
    previous: Option<&PreviousState>,
    secrets: &dyn SecretGenerator,
) -> Result<Identity, SecretError> {
    match previous {
        Some(prev) => Ok(Identity {
            identifier: prev.identifier.clone(),
            admin_password: prev.admin_password.clone(),
        }),
        None => Ok(Identity {
            identifier: secrets.generate(IDENTIFIER_LENGTH)?,
            admin_password: secrets.generate(ADMIN_PASSWORD_LENGTH)?,
        }),
    }
}
