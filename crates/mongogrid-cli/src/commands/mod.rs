pub mod generate;
pub mod topology;

use std::path::Path;

use mongogrid_core::RequestParameters;

/// Read the caller's parameters from a broker request file, if one was given.
pub fn load_request_params(path: Option<&Path>) -> anyhow::Result<RequestParameters> {
    let Some(path) = path else {
        return Ok(RequestParameters::default());
    };
    let content = std::fs::read_to_string(path)?;
    let request: serde_json::Value = serde_json::from_str(&content)?;
    Ok(RequestParameters::from_request(&request)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_request_file_means_no_overrides() {
        assert_eq!(load_request_params(None).unwrap(), RequestParameters::default());
    }

    #[test]
    fn reads_parameters_from_request_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        std::fs::write(&path, r#"{ "parameters": { "shards": 4, "orgId": "org-1" } }"#).unwrap();

        let params = load_request_params(Some(path.as_path())).unwrap();
        assert_eq!(params.shards, Some(4));
        assert_eq!(params.org_id.as_deref(), Some("org-1"));
    }
}
