use serde::{Deserialize, Serialize};

use super::domain::{is_filled, JobSeekerProfile, ProfileRelationCounts};

const MAX_SCORE: u8 = 100;

/// Scored part of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileItem {
    FullName,
    VerifiedEmail,
    Phone,
    Address,
    ExperienceLevel,
    ProfilePhoto,
    Resume,
    Summary,
    Skills,
    WorkExperience,
    Education,
    Languages,
    Licenses,
}

impl ProfileItem {
    pub const ALL: [ProfileItem; 13] = [
        ProfileItem::FullName,
        ProfileItem::VerifiedEmail,
        ProfileItem::Phone,
        ProfileItem::Address,
        ProfileItem::ExperienceLevel,
        ProfileItem::ProfilePhoto,
        ProfileItem::Resume,
        ProfileItem::Summary,
        ProfileItem::Skills,
        ProfileItem::WorkExperience,
        ProfileItem::Education,
        ProfileItem::Languages,
        ProfileItem::Licenses,
    ];

    pub const fn points(self) -> u8 {
        match self {
            ProfileItem::FullName
            | ProfileItem::ProfilePhoto
            | ProfileItem::Resume
            | ProfileItem::Summary => 10,
            ProfileItem::VerifiedEmail
            | ProfileItem::Phone
            | ProfileItem::Address
            | ProfileItem::ExperienceLevel => 5,
            ProfileItem::Skills
            | ProfileItem::WorkExperience
            | ProfileItem::Education
            | ProfileItem::Languages
            | ProfileItem::Licenses => 8,
        }
    }

    /// Call to action shown next to an incomplete profile.
    pub const fn hint(self) -> &'static str {
        match self {
            ProfileItem::FullName => "Add your full name",
            ProfileItem::VerifiedEmail => "Verify your email address",
            ProfileItem::Phone => "Add a phone number",
            ProfileItem::Address => "Add your address",
            ProfileItem::ExperienceLevel => "Select your experience level",
            ProfileItem::ProfilePhoto => "Upload a profile photo",
            ProfileItem::Resume => "Upload your resume",
            ProfileItem::Summary => "Write a short professional summary",
            ProfileItem::Skills => "List at least one skill",
            ProfileItem::WorkExperience => "Add your work experience",
            ProfileItem::Education => "Add your education",
            ProfileItem::Languages => "Add the languages you speak",
            ProfileItem::Licenses => "Add licenses or certifications",
        }
    }

    fn is_earned(self, profile: Option<&JobSeekerProfile>, counts: &ProfileRelationCounts) -> bool {
        let Some(profile) = profile else {
            return self.is_earned_by_counts(counts);
        };

        match self {
            ProfileItem::FullName => is_filled(profile.full_name.as_deref()),
            ProfileItem::VerifiedEmail => {
                profile.email_verified && is_filled(profile.email.as_deref())
            }
            ProfileItem::Phone => is_filled(profile.phone.as_deref()),
            ProfileItem::Address => is_filled(profile.address.as_deref()),
            ProfileItem::ExperienceLevel => is_filled(profile.experience_level.as_deref()),
            ProfileItem::ProfilePhoto => is_filled(profile.profile_photo_file_name.as_deref()),
            ProfileItem::Resume => is_filled(profile.resume_file_name.as_deref()),
            ProfileItem::Summary => is_filled(profile.summary.as_deref()),
            _ => self.is_earned_by_counts(counts),
        }
    }

    fn is_earned_by_counts(self, counts: &ProfileRelationCounts) -> bool {
        match self {
            ProfileItem::Skills => counts.skills > 0,
            ProfileItem::WorkExperience => counts.work_experiences > 0,
            ProfileItem::Education => counts.educations > 0,
            ProfileItem::Languages => counts.languages > 0,
            ProfileItem::Licenses => counts.licenses > 0,
            _ => false,
        }
    }
}

/// Contribution of one profile item to the completeness score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessComponent {
    pub item: ProfileItem,
    pub points: u8,
    pub earned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessReport {
    pub score: u8,
    pub components: Vec<CompletenessComponent>,
    pub missing: Vec<ProfileItem>,
}

impl CompletenessReport {
    pub fn is_complete(&self) -> bool {
        self.score == MAX_SCORE
    }

    pub fn hints(&self) -> Vec<&'static str> {
        self.missing.iter().map(|item| item.hint()).collect()
    }
}

/// Score a profile from 0 to 100. A missing profile scores only its relation counts.
pub fn profile_completeness_score(
    profile: Option<&JobSeekerProfile>,
    counts: &ProfileRelationCounts,
) -> u8 {
    assess_profile(profile, counts).score
}

/// Itemized completeness assessment.
pub fn assess_profile(
    profile: Option<&JobSeekerProfile>,
    counts: &ProfileRelationCounts,
) -> CompletenessReport {
    let components: Vec<CompletenessComponent> = ProfileItem::ALL
        .iter()
        .map(|&item| CompletenessComponent {
            item,
            points: item.points(),
            earned: item.is_earned(profile, counts),
        })
        .collect();

    let total: u32 = components
        .iter()
        .filter(|component| component.earned)
        .map(|component| u32::from(component.points))
        .sum();
    let score = total.min(u32::from(MAX_SCORE)) as u8;

    let missing = components
        .iter()
        .filter(|component| !component.earned)
        .map(|component| component.item)
        .collect();

    CompletenessReport {
        score,
        components,
        missing,
    }
}
