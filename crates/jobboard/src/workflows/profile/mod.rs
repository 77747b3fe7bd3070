//! Profile completeness scoring for job seekers.

pub mod completeness;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use completeness::{
    assess_profile, profile_completeness_score, CompletenessComponent, CompletenessReport,
    ProfileItem,
};
pub use domain::{JobSeekerProfile, ProfileRelationCounts, ProfileSnapshot};
pub use repository::ProfileLookup;
pub use router::profile_router;
pub use service::{ProfileService, ProfileServiceError};
