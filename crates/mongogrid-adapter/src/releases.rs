//! Job → release resolution.

use mongogrid_core::ServiceRelease;

use crate::error::ReleaseError;

/// A job bound to the single release that provides it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseBinding {
    pub job: String,
    pub release: String,
    pub version: String,
}

/// Find the one release in `catalog` that declares `job`.
pub fn find_release_for_job<'a>(
    catalog: &'a [ServiceRelease],
    job: &str,
) -> Result<&'a ServiceRelease, ReleaseError> {
    let matches: Vec<&ServiceRelease> = catalog.iter().filter(|r| r.provides(job)).collect();

    match matches.as_slice() {
        [] => Err(ReleaseError::NoReleaseForJob {
            job: job.to_string(),
        }),
        [release] => Ok(*release),
        many => Err(ReleaseError::AmbiguousRelease {
            job: job.to_string(),
            releases: many.iter().map(|r| r.name.clone()).collect(),
        }),
    }
}

/// Bind every required job, in order. The first failure wins.
pub fn resolve_jobs(
    catalog: &[ServiceRelease],
    required_jobs: &[&str],
) -> Result<Vec<ReleaseBinding>, ReleaseError> {
    required_jobs
        .iter()
        .map(|job| {
            find_release_for_job(catalog, job).map(|release| ReleaseBinding {
                job: job.to_string(),
                release: release.name.clone(),
                version: release.version.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(name: &str, jobs: &[&str]) -> ServiceRelease {
        ServiceRelease {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            jobs: jobs.iter().map(|j| j.to_string()).collect(),
        }
    }

    #[test]
    fn binds_each_job_to_its_release() {
        let catalog = vec![
            release("mongodb", &["mongod_node"]),
            release("mongodb-agent", &["mongodb_config_agent", "cleanup_service"]),
        ];
        let bindings = resolve_jobs(&catalog, &["mongod_node", "mongodb_config_agent"]).unwrap();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].release, "mongodb");
        assert_eq!(bindings[1].release, "mongodb-agent");
        assert_eq!(bindings[1].job, "mongodb_config_agent");
    }

    #[test]
    fn ambiguous_job_lists_releases_in_order() {
        let catalog = vec![
            release("mongodb-b", &["mongod_node"]),
            release("other", &["syslog"]),
            release("mongodb-a", &["mongod_node"]),
        ];
        let err = resolve_jobs(&catalog, &["mongod_node"]).unwrap_err();
        assert_eq!(
            err,
            ReleaseError::AmbiguousRelease {
                job: "mongod_node".to_string(),
                releases: vec!["mongodb-b".to_string(), "mongodb-a".to_string()],
            }
        );
        assert_eq!(
            err.to_string(),
            "job 'mongod_node' defined in multiple releases: mongodb-b, mongodb-a"
        );
    }

    #[test]
    fn missing_job_is_reported() {
        let catalog = vec![release("mongodb", &["mongod_node"])];
        let err = resolve_jobs(&catalog, &["mongod_node", "mongodb_config_agent"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "no release provided for job 'mongodb_config_agent'"
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let catalog = vec![release("mongodb", &["mongod_node", "mongodb_config_agent"])];
        let a = resolve_jobs(&catalog, &["mongod_node", "mongodb_config_agent"]).unwrap();
        let b = resolve_jobs(&catalog, &["mongod_node", "mongodb_config_agent"]).unwrap();
        assert_eq!(a, b);
    }
}
