use serde::{Deserialize, Serialize};

/// Free-text fields of a job seeker's profile. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSeekerProfile {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub email_verified: bool,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub experience_level: Option<String>,
    pub profile_photo_file_name: Option<String>,
    pub resume_file_name: Option<String>,
    pub summary: Option<String>,
}

/// Number of records in each collection owned by the profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRelationCounts {
    pub skills: u32,
    pub work_experiences: u32,
    pub educations: u32,
    pub languages: u32,
    pub licenses: u32,
}

/// Profile plus relation counts as returned by a [`super::repository::ProfileLookup`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub profile: JobSeekerProfile,
    pub counts: ProfileRelationCounts,
}

pub(crate) fn is_filled(value: Option<&str>) -> bool {
    value.is_some_and(|text| !text.trim().is_empty())
}
