//! Group reconciliation — replace on every update.
//!
//! The Ops Manager read API omits the agent key for groups that were
//! recreated outside our control, and stale groups may be reaped
//! asynchronously. So a previously recorded group is always deleted and a
//! fresh one created, even when nothing about it changed.
//!
//! The two steps are not atomic. If the delete succeeds and the create
//! fails, no group exists until the next generation, which will try to
//! delete the old reference again. `GroupApi::delete_group` therefore
//! treats an absent group as deleted.

use tracing::info;

use crate::error::GroupApiResult;
use crate::group::{Group, GroupApi, GroupCreateRequest};

/// The group the deployment should end up with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredGroup {
    /// Stable cluster identifier.
    pub identifier: String,
    pub name: Option<String>,
    pub org_id: Option<String>,
    pub tags: Vec<String>,
}

pub struct GroupReconciler<'a> {
    api: &'a dyn GroupApi,
}

impl<'a> GroupReconciler<'a> {
    pub fn new(api: &'a dyn GroupApi) -> Self {
        Self { api }
    }

    /// Delete `previous_group_id` (if any), then create the desired group.
    ///
    /// A failed delete aborts before anything is created.
    pub fn reconcile(
        &self,
        desired: &DesiredGroup,
        previous_group_id: Option<&str>,
    ) -> GroupApiResult<Group> {
        if let Some(previous) = previous_group_id {
            info!(group_id = %previous, "deleting previous group");
            self.api.delete_group(previous)?;
        }

        let request = GroupCreateRequest {
            name: desired.name.clone(),
            org_id: desired.org_id.clone(),
            tags: desired.tags.clone(),
        };
        let group = self.api.create_group(&desired.identifier, &request)?;
        info!(group_id = %group.id, identifier = %desired.identifier, "created group");
        Ok(group)
    }
}
