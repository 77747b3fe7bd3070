use super::domain::ProfileSnapshot;
use crate::workflows::screening::domain::JobSeekerId;
use crate::workflows::screening::repository::RepositoryError;

/// Read access to job seeker profiles and the sizes of their owned collections.
pub trait ProfileLookup: Send + Sync {
    fn profile(&self, id: &JobSeekerId) -> Result<Option<ProfileSnapshot>, RepositoryError>;
}
