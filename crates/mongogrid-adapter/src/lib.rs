//! mongogrid-adapter — manifest generation for MongoDB service instances.
//!
//! Turns a plan, caller parameters, a release catalog, and (optionally) the
//! previously generated manifest into a new deployment manifest, keeping the
//! cluster's Ops Manager group in step along the way.
//!
//! # Architecture
//!
//! ```text
//! ManifestGenerator
//!   ├── topology   (plan kind + overrides → instance counts)
//!   ├── releases   (job name → exactly one providing release)
//!   ├── carryover  (previous manifest → identifier + admin password)
//!   ├── GroupReconciler (delete previous group, create a fresh one)
//!   └── assemble   (compose the three instance groups + rollout policy)
//! ```

pub mod assemble;
pub mod carryover;
pub mod error;
pub mod generator;
pub mod releases;
pub mod secrets;
pub mod topology;

pub use carryover::{Identity, PreviousState};
pub use error::{GenerateError, GenerateResult, ReleaseError, SecretError};
pub use generator::{GenerationRequest, ManifestGenerator};
pub use releases::{ReleaseBinding, resolve_jobs};
pub use secrets::{OsSecretGenerator, SecretGenerator};
pub use topology::{ShardedDefaults, Topology};
