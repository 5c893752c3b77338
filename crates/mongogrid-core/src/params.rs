//! Typed request parameters.
//!
//! Callers send an untyped `parameters` object. It is decoded once, here,
//! into [`RequestParameters`]. Count overrides follow a tolerant-defaults
//! policy: anything that is not a number of at least one is treated as
//! absent so the plan default applies. Text overrides that have the wrong
//! type are rejected with [`ConfigError::InvalidParameter`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigResult};

/// Key under which brokers nest caller-supplied parameters.
pub const ARBITRARY_PARAMS_KEY: &str = "parameters";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParameters {
    /// Engine version. An empty string counts as absent.
    pub version: Option<String>,
    pub replicas: Option<u32>,
    pub shards: Option<u32>,
    pub config_servers: Option<u32>,
    /// Router (`mongos`) count.
    pub mongos: Option<u32>,
    /// Display name for the external group (`projectName`).
    pub project_name: Option<String>,
    /// Organization reference for the external group (`orgId`).
    pub org_id: Option<String>,
}

impl RequestParameters {
    /// Decode a full broker request, reading the nested `parameters` object.
    ///
    /// A missing or `null` request yields empty parameters.
    pub fn from_request(request: &Value) -> ConfigResult<Self> {
        match request.get(ARBITRARY_PARAMS_KEY) {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(Value::Object(params)) => Self::from_arbitrary(params),
            Some(_) => Err(ConfigError::InvalidParameter {
                name: ARBITRARY_PARAMS_KEY.to_string(),
                expected: "an object",
            }),
        }
    }

    /// Decode the caller's arbitrary parameter map.
    pub fn from_arbitrary(params: &Map<String, Value>) -> ConfigResult<Self> {
        Ok(Self {
            version: params
                .get("version")
                .and_then(Value::as_str)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            replicas: positive_count(params.get("replicas")),
            shards: positive_count(params.get("shards")),
            config_servers: positive_count(params.get("config_servers")),
            mongos: positive_count(params.get("mongos")),
            project_name: optional_string(params, "projectName")?,
            org_id: optional_string(params, "orgId")?,
        })
    }
}

/// A count override is honoured only when it is numeric and at least one.
/// Fractional values truncate.
fn positive_count(value: Option<&Value>) -> Option<u32> {
    let n = value?.as_f64()?;
    if n >= 1.0 {
        Some(n.min(f64::from(u32::MAX)) as u32)
    } else {
        None
    }
}

fn optional_string(params: &Map<String, Value>, name: &str) -> ConfigResult<Option<String>> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ConfigError::InvalidParameter {
            name: name.to_string(),
            expected: "a string",
        }),
    }
}
