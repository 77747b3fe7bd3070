use std::sync::Arc;

use tracing::debug;

use super::completeness::{assess_profile, CompletenessReport};
use super::repository::ProfileLookup;
use crate::workflows::screening::domain::JobSeekerId;
use crate::workflows::screening::repository::RepositoryError;

/// Computes completeness reports on demand. Scores are never persisted.
pub struct ProfileService<P> {
    lookup: Arc<P>,
}

impl<P> ProfileService<P>
where
    P: ProfileLookup + 'static,
{
    pub fn new(lookup: Arc<P>) -> Self {
        Self { lookup }
    }

    /// Completeness of a job seeker's profile. Unknown job seekers score zero.
    pub fn completeness(
        &self,
        job_seeker_id: &JobSeekerId,
    ) -> Result<CompletenessReport, ProfileServiceError> {
        let report = match self.lookup.profile(job_seeker_id)? {
            Some(snapshot) => assess_profile(Some(&snapshot.profile), &snapshot.counts),
            None => {
                debug!(job_seeker_id = %job_seeker_id.0, "no profile found, scoring empty");
                assess_profile(None, &Default::default())
            }
        };
        Ok(report)
    }
}

/// Error raised by the profile service.
#[derive(Debug, thiserror::Error)]
pub enum ProfileServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
