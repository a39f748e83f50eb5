use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};
use unicode_segmentation::UnicodeSegmentation;
use validator::ValidateUrl;

const HANDLE_MIN_LENGTH: usize = 2;
const HANDLE_MAX_LENGTH: usize = 40;

// Every key `ProfileInput` reads, aliases included.
const TEXT_FIELDS: [&str; 14] = [
    "handle",
    "company",
    "website",
    "location",
    "bio",
    "status",
    "github_username",
    "githubusername",
    "skills",
    "youtube",
    "twitter",
    "facebook",
    "linkedin",
    "instagram",
];

/// The raw field map submitted to create or update a profile.
/// Social links arrive as top-level fields alongside the profile fields.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ProfileInput {
    pub handle: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    #[serde(alias = "githubusername")]
    pub github_username: Option<String>,
    pub skills: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

impl ProfileInput {
    /// Read a submitted JSON object, reporting every known field that holds
    /// something other than a string (or null) under its own name.
    pub fn from_json(body: Map<String, Value>) -> Result<Self, ProfileInputErrors> {
        let mut errors = ProfileInputErrors::default();
        for field in TEXT_FIELDS {
            if let Some(value) = body.get(field) {
                if !(value.is_string() || value.is_null()) {
                    errors.add(field, "Must be a string");
                }
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        serde_json::from_value(Value::Object(body)).map_err(|e| {
            errors.add("body", e.to_string());
            errors
        })
    }
}

// Field-level validation messages, keyed by input field name.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct ProfileInputErrors(BTreeMap<&'static str, String>);

impl ProfileInputErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ProfileInputErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.keys().copied().collect();
        write!(f, "Invalid profile fields: {}", fields.join(", "))
    }
}

/// Validates a submitted field map, returning either a normalized copy of it
/// or every field-level error found.
pub trait ProfileValidator: Send + Sync {
    fn validate(&self, input: ProfileInput) -> Result<ProfileInput, ProfileInputErrors>;
}

/// Default validation rules for profile submissions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileInputValidator;

impl ProfileValidator for ProfileInputValidator {
    fn validate(&self, input: ProfileInput) -> Result<ProfileInput, ProfileInputErrors> {
        let input = normalize(input);
        let mut errors = ProfileInputErrors::default();

        if let Some(handle) = &input.handle {
            let length = handle.graphemes(true).count();
            if !(HANDLE_MIN_LENGTH..=HANDLE_MAX_LENGTH).contains(&length) {
                errors.add("handle", "Handle needs to between 2 and 40 characters");
            }
        }

        if input.status.is_none() {
            errors.add("status", "Status field is required");
        }

        let links = [
            ("website", &input.website),
            ("youtube", &input.youtube),
            ("twitter", &input.twitter),
            ("facebook", &input.facebook),
            ("linkedin", &input.linkedin),
            ("instagram", &input.instagram),
        ];
        for (field, value) in links {
            if let Some(url) = value {
                if !url.validate_url() {
                    errors.add(field, "Not a valid URL");
                }
            }
        }

        if errors.is_empty() {
            Ok(input)
        } else {
            Err(errors)
        }
    }
}

// Empty strings count as "not supplied" for every optional text field.
// `skills` is kept verbatim: an empty skills string is still a submission.
fn normalize(input: ProfileInput) -> ProfileInput {
    let present = |value: Option<String>| value.filter(|v| !v.is_empty());
    ProfileInput {
        handle: present(input.handle),
        company: present(input.company),
        website: present(input.website),
        location: present(input.location),
        bio: present(input.bio),
        status: present(input.status),
        github_username: present(input.github_username),
        skills: input.skills,
        youtube: present(input.youtube),
        twitter: present(input.twitter),
        facebook: present(input.facebook),
        linkedin: present(input.linkedin),
        instagram: present(input.instagram),
    }
}
