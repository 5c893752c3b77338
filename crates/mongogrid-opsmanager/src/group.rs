//! External group types and the collaborator interface.

use serde::{Deserialize, Serialize};

use crate::error::GroupApiResult;

/// A remote Ops Manager group scoping one deployed cluster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    /// Key used by automation agents. Issued fresh on every create.
    #[serde(default)]
    pub agent_api_key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Attributes requested for a new group.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupCreateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Synchronous group operations offered by the external API.
///
/// Groups are never updated in place: callers delete and recreate.
pub trait GroupApi {
    /// Delete a group. A group that is already gone counts as deleted.
    fn delete_group(&self, group_id: &str) -> GroupApiResult<()>;

    /// Create a group for the cluster with the given stable identifier.
    fn create_group(
        &self,
        identifier: &str,
        request: &GroupCreateRequest,
    ) -> GroupApiResult<Group>;

    /// Latest engine version available to the group.
    ///
    /// Best effort: returns an empty string when it cannot be determined.
    fn latest_engine_version(&self, group_id: &str) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_api_group_payload() {
        let json = r#"{
            "id": "5f1a",
            "name": "orders",
            "orgId": "org-1",
            "agentApiKey": "agent-key",
            "tags": ["prod"],
            "activeAgentCount": 0
        }"#;
        let group: Group = serde_json::from_str(json).unwrap();
        assert_eq!(group.id, "5f1a");
        assert_eq!(group.agent_api_key, "agent-key");
        assert_eq!(group.org_id.as_deref(), Some("org-1"));
        assert_eq!(group.tags, vec!["prod"]);
    }

    #[test]
    fn create_request_omits_unset_fields() {
        let req = GroupCreateRequest {
            tags: vec!["prod".to_string()],
            ..Default::default()
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("name").is_none());
        assert!(json.get("orgId").is_none());
        assert_eq!(json["tags"][0], "prod");
    }
}
