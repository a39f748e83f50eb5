use crate::domain::{ProfileInput, Social};

/// The normalized set of fields a single upsert writes. Every `None` means
/// "not supplied": it is left out of a new profile and leaves the stored
/// value untouched on update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileFields {
    pub handle: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub github_username: Option<String>,
    pub skills: Option<Vec<String>>,
    pub social: Social,
}

impl From<ProfileInput> for ProfileFields {
    fn from(input: ProfileInput) -> Self {
        Self {
            handle: input.handle,
            company: input.company,
            website: input.website,
            location: input.location,
            bio: input.bio,
            status: input.status,
            github_username: input.github_username,
            skills: input.skills.as_deref().map(split_skills),
            social: Social {
                youtube: input.youtube,
                twitter: input.twitter,
                facebook: input.facebook,
                linkedin: input.linkedin,
                instagram: input.instagram,
            },
        }
    }
}

/// Split a comma-delimited skills string. Entries are neither trimmed nor
/// filtered, so `""` yields `[""]`.
pub fn split_skills(skills: &str) -> Vec<String> {
    skills.split(',').map(String::from).collect()
}
