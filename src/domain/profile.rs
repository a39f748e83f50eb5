use chrono::{DateTime, Utc};
use uuid::Uuid;

// Social network links attached to a profile. Absent networks are omitted
// from the serialized document.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Social {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

// The identity a profile belongs to. `name` and `avatar` are only filled in
// on read paths, where the owner's identity record is joined in.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Owner {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[cfg(test)]
impl Owner {
    pub fn unpopulated(id: Uuid) -> Self {
        Self {
            id,
            name: None,
            avatar: None,
        }
    }
}

/// A persisted profile document.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub owner: Owner,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    pub social: Social,
    pub date: DateTime<Utc>,
}

impl Profile {
    pub fn owner_id(&self) -> Uuid {
        self.owner.id
    }
}
