//! Blocking HTTP client for the Ops Manager public API.
//!
//! The public API authenticates with HTTP Digest: each request is sent once
//! unauthenticated, and a `401` challenge is answered with a single retry
//! carrying the digest response for the username and API key.

use std::time::Duration;

use digest_auth::{AuthContext, HttpMethod};
use mongogrid_core::OpsManagerConfig;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, HeaderValue, WWW_AUTHENTICATE};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::{GroupApiError, GroupApiResult};
use crate::group::{Group, GroupApi, GroupCreateRequest};

const API_PREFIX: [&str; 3] = ["api", "public", "v1.0"];
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Ops Manager client authenticated with a username and API key.
pub struct OpsManagerClient {
    base_url: Url,
    username: String,
    api_key: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AutomationConfig {
    #[serde(default)]
    mongo_db_versions: Vec<MongoDbVersion>,
}

#[derive(Debug, Deserialize)]
struct MongoDbVersion {
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateGroupBody<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    org_id: Option<&'a str>,
    tags: &'a [String],
}

/// Body of a create call. The group is named after the identifier unless
/// the caller asked for a display name.
fn create_body<'a>(identifier: &'a str, request: &'a GroupCreateRequest) -> CreateGroupBody<'a> {
    CreateGroupBody {
        name: request.name.as_deref().unwrap_or(identifier),
        org_id: request.org_id.as_deref(),
        tags: &request.tags,
    }
}

impl OpsManagerClient {
    pub fn new(config: &OpsManagerConfig) -> GroupApiResult<Self> {
        Self::with_timeout(config, DEFAULT_TIMEOUT)
    }

    /// Create a client whose every request is bounded by `timeout`.
    pub fn with_timeout(config: &OpsManagerConfig, timeout: Duration) -> GroupApiResult<Self> {
        let raw = config.url.trim_end_matches('/');
        let base_url =
            Url::parse(raw).map_err(|e| GroupApiError::InvalidUrl(format!("{raw}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(GroupApiError::InvalidUrl(format!("{raw}: not a base url")));
        }

        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            username: config.username.clone(),
            api_key: config.api_key.clone(),
            http,
        })
    }

    /// API url for `segments`. Each segment is percent-encoded on its own, so
    /// `/`, `?` and `#` inside a segment never change the request target.
    fn endpoint(&self, segments: &[&str]) -> GroupApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GroupApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    fn group_endpoint(&self, group_id: &str, rest: &[&str]) -> GroupApiResult<Url> {
        if matches!(group_id, "" | "." | "..") {
            return Err(GroupApiError::InvalidGroupId(group_id.to_string()));
        }
        let mut segments = vec!["groups", group_id];
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    /// Send `request`, answering a digest challenge with one authenticated retry.
    fn send(&self, request: RequestBuilder) -> GroupApiResult<Response> {
        let retry = request
            .try_clone()
            .ok_or_else(|| GroupApiError::Auth("request body cannot be replayed".to_string()))?;
        let resp = request.send()?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        let challenge = resp
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| GroupApiError::Auth("401 without a digest challenge".to_string()))?
            .to_string();

        let mut retry = retry.build()?;
        let header = digest_authorization(
            &self.username,
            &self.api_key,
            retry.method(),
            retry.url(),
            &challenge,
        )?;
        let value = HeaderValue::from_str(&header).map_err(|e| GroupApiError::Auth(e.to_string()))?;
        retry.headers_mut().insert(AUTHORIZATION, value);
        Ok(self.http.execute(retry)?)
    }

    fn fetch_automation_config(&self, group_id: &str) -> GroupApiResult<AutomationConfig> {
        let url = self.group_endpoint(group_id, &["automationConfig"])?;
        let resp = ensure_success(self.send(self.http.get(url))?)?;
        resp.json().map_err(|e| GroupApiError::Decode(e.to_string()))
    }
}

/// `Authorization` header value answering the `WWW-Authenticate` `challenge`.
fn digest_authorization(
    username: &str,
    api_key: &str,
    method: &Method,
    url: &Url,
    challenge: &str,
) -> GroupApiResult<String> {
    let mut prompt =
        digest_auth::parse(challenge).map_err(|e| GroupApiError::Auth(e.to_string()))?;
    let uri = match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    };
    let context = AuthContext::new_with_method(
        username,
        api_key,
        uri,
        None::<&[u8]>,
        HttpMethod::from(method.as_str()),
    );
    let answer = prompt
        .respond(&context)
        .map_err(|e| GroupApiError::Auth(e.to_string()))?;
    Ok(answer.to_header_string())
}

impl GroupApi for OpsManagerClient {
    fn delete_group(&self, group_id: &str) -> GroupApiResult<()> {
        let url = self.group_endpoint(group_id, &[])?;
        let resp = self.send(self.http.delete(url))?;

        if resp.status() == StatusCode::NOT_FOUND {
            debug!(%group_id, "group already absent");
            return Ok(());
        }
        ensure_success(resp)?;
        Ok(())
    }

    fn create_group(
        &self,
        identifier: &str,
        request: &GroupCreateRequest,
    ) -> GroupApiResult<Group> {
        let url = self.endpoint(&["groups"])?;
        let body = create_body(identifier, request);
        let resp = ensure_success(self.send(self.http.post(url).json(&body))?)?;
        resp.json().map_err(|e| GroupApiError::Decode(e.to_string()))
    }
    fn latest_engine_version(&self, group_id: &str) -> String {
        match self.fetch_automation_config(group_id) {
            Ok(config) => {
                let names = config.mongo_db_versions.into_iter().map(|v| v.name);
                latest_version(names).unwrap_or_default()
            }
            Err(e) => {
                warn!(%group_id, error = %e, "could not fetch available engine versions");
                String::new()
            }
        }
    }
}

fn ensure_success(resp: Response) -> GroupApiResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(GroupApiError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Pick the highest semantic version among `names`, ignoring names that do
/// not parse. The original spelling of the winner is returned.
pub(crate) fn latest_version(names: impl IntoIterator<Item = String>) -> Option<String> {
    names
        .into_iter()
        .filter_map(|name| semver::Version::parse(&name).ok().map(|v| (v, name)))
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, name)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> OpsManagerConfig {
        OpsManagerConfig {
            url: url.to_string(),
            username: "admin".to_string(),
            api_key: "key".to_string(),
            tags: None,
        }
    }

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn picks_highest_semver() {
        let latest = latest_version(names(&["4.4.9", "6.0.5", "5.0.14"]));
        assert_eq!(latest.as_deref(), Some("6.0.5"));
    }

    #[test]
    fn release_outranks_suffixed_build() {
        let latest = latest_version(names(&["6.0.5-ent", "6.0.5"]));
        assert_eq!(latest.as_deref(), Some("6.0.5"));
    }

    #[test]
    fn ignores_unparseable_versions() {
        assert_eq!(latest_version(names(&["latest", "3.6"])), None);
        assert_eq!(latest_version(Vec::new()), None);
    }

    #[test]
    fn decodes_automation_config_versions() {
        let json = r#"{ "mongoDbVersions": [{ "name": "6.0.5", "builds": [] }], "processes": [] }"#;
        let config: AutomationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.mongo_db_versions[0].name, "6.0.5");
    }

    #[test]
    fn builds_group_endpoints() {
        let client = OpsManagerClient::new(&config("https://ops.example.com/")).unwrap();
        let url = client.group_endpoint("abc", &[]).unwrap();
        assert_eq!(url.as_str(), "https://ops.example.com/api/public/v1.0/groups/abc");

        let url = client.group_endpoint("abc", &["automationConfig"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://ops.example.com/api/public/v1.0/groups/abc/automationConfig"
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        let client = OpsManagerClient::new(&config("https://ops.example.com/mms")).unwrap();
        let url = client.endpoint(&["groups"]).unwrap();
        assert_eq!(url.as_str(), "https://ops.example.com/mms/api/public/v1.0/groups");
    }

    #[test]
    fn group_id_cannot_escape_groups_path() {
        let client = OpsManagerClient::new(&config("https://ops.example.com")).unwrap();
        let url = client.group_endpoint("../../../admin/users?x=#frag", &[]).unwrap();

        assert!(url.path().starts_with("/api/public/v1.0/groups/"));
        assert_eq!(url.path_segments().unwrap().count(), 5);
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn rejects_dot_segment_group_ids() {
        let client = OpsManagerClient::new(&config("https://ops.example.com")).unwrap();
        for id in ["", ".", ".."] {
            let err = client.group_endpoint(id, &[]).unwrap_err();
            assert!(matches!(err, GroupApiError::InvalidGroupId(_)), "{id:?}");
        }
    }

    #[test]
    fn rejects_invalid_base_url() {
        let err = OpsManagerClient::new(&config("not a url")).err().unwrap();
        assert!(matches!(err, GroupApiError::InvalidUrl(_)));

        let err = OpsManagerClient::new(&config("mailto:ops@example.com")).err().unwrap();
        assert!(matches!(err, GroupApiError::InvalidUrl(_)));
    }

    #[test]
    fn create_body_defaults_name_to_identifier() {
        let request = GroupCreateRequest {
            tags: names(&["prod"]),
            ..GroupCreateRequest::default()
        };
        let json = serde_json::to_value(create_body("abcd1234", &request)).unwrap();

        assert_eq!(json["name"], "abcd1234");
        assert_eq!(json["tags"], serde_json::json!(["prod"]));
        assert!(json.get("orgId").is_none());
    }

    #[test]
    fn create_body_prefers_requested_name() {
        let request = GroupCreateRequest {
            name: Some("orders".to_string()),
            org_id: Some("org-1".to_string()),
            tags: Vec::new(),
        };
        let json = serde_json::to_value(create_body("abcd1234", &request)).unwrap();

        assert_eq!(json["name"], "orders");
        assert_eq!(json["orgId"], "org-1");
    }

    #[test]
    fn answers_digest_challenge() {
        let url = Url::parse("https://ops.example.com/api/public/v1.0/groups/g1").unwrap();
        let challenge =
            r#"Digest realm="MMS Public API", nonce="n0nce", algorithm=MD5, qop="auth""#;

        let header =
            digest_authorization("admin", "key", &Method::DELETE, &url, challenge).unwrap();

        assert!(header.starts_with("Digest "));
        assert!(header.contains(r#"username="admin""#));
        assert!(header.contains(r#"uri="/api/public/v1.0/groups/g1""#));
        assert!(header.contains(r#"nonce="n0nce""#));
        assert!(!header.contains("key"));
    }

    #[test]
    fn rejects_non_digest_challenge() {
        let url = Url::parse("https://ops.example.com/api/public/v1.0/groups").unwrap();
        let err = digest_authorization("admin", "key", &Method::POST, &url, r#"Basic realm="x""#)
            .unwrap_err();
        assert!(matches!(err, GroupApiError::Auth(_)));
    }
}
