//! MongoGrid Ops Manager integration.
//!
//! Every deployed cluster is scoped by an external Ops Manager group
//! (project). This crate owns all traffic to that API.
//!
//! # Components
//!
//! - **`group`** — `GroupApi` collaborator interface and group types
//! - **`http`** — Blocking HTTP implementation of `GroupApi`
//! - **`reconcile`** — Replace-on-every-update group reconciliation

pub mod error;
pub mod group;
pub mod http;
pub mod reconcile;

pub use error::{GroupApiError, GroupApiResult};
pub use group::{Group, GroupApi, GroupCreateRequest};
pub use http::OpsManagerClient;
pub use reconcile::{DesiredGroup, GroupReconciler};
