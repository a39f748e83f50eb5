mod profile;
mod profile_fields;
mod profile_input;

pub use profile::{Owner, Profile, Social};
pub use profile_fields::{ProfileFields, split_skills};
pub use profile_input::{ProfileInput, ProfileInputErrors, ProfileInputValidator, ProfileValidator};
