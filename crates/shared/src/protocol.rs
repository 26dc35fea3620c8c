use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{
    ApplicantStatus, ApplicationId, ProposalId, ProposalStatus, StatusDecision, UserId,
};

const UNDISCLOSED_TITLE: &str = "Not Disclosed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    #[serde(rename = "_id", alias = "id")]
    pub id: ProposalId,
    #[serde(rename = "proposalTitle", default)]
    pub title: String,
    #[serde(rename = "proposalDescription", default)]
    pub description: String,
    #[serde(rename = "skillsRequired", default)]
    pub skills_required: Vec<RequiredSkill>,
    #[serde(rename = "proposalStatus")]
    pub status: ProposalStatus,
    pub application_deadline: DateTime<Utc>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_applicants")]
    pub applicants: Vec<Applicant>,
}

impl Proposal {
    pub fn skill_labels(&self) -> impl Iterator<Item = &str> {
        self.skills_required.iter().filter_map(RequiredSkill::label)
    }

    pub fn has_applicant(&self, user_id: &UserId) -> bool {
        self.applicants
            .iter()
            .any(|applicant| &applicant.applicant.id == user_id)
    }

    pub fn applicant(&self, user_id: &UserId) -> Option<&Applicant> {
        self.applicants
            .iter()
            .find(|applicant| &applicant.applicant.id == user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredSkill {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
}

impl RequiredSkill {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            skill: Some(label.into()),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.skill.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ApplicationId>,
    pub applicant: ApplicantProfile,
    #[serde(default)]
    pub applied_on: DateTime<Utc>,
    #[serde(default)]
    pub status: ApplicantStatus,
}

impl Applicant {
    pub fn user_id(&self) -> &UserId {
        &self.applicant.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<ProfileAbout>,
}

impl ApplicantProfile {
    pub fn display_name(&self) -> &str {
        self.about
            .as_ref()
            .and_then(|about| about.name.as_deref())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("Applicant")
    }

    pub fn title(&self) -> &str {
        self.about
            .as_ref()
            .and_then(|about| about.title.as_deref())
            .filter(|title| !title.trim().is_empty())
            .unwrap_or(UNDISCLOSED_TITLE)
    }

    /// First character of each whitespace-separated word of the display name.
    pub fn initials(&self) -> String {
        self.display_name()
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .collect()
    }
}

/// Applicant entries whose user reference is missing or null (a deleted
/// account) are dropped instead of failing the whole document.
fn deserialize_applicants<'de, D>(deserializer: D) -> Result<Vec<Applicant>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Entry {
        #[serde(rename = "_id", default)]
        id: Option<ApplicationId>,
        #[serde(default)]
        applicant: Option<ProfileRef>,
        #[serde(default)]
        applied_on: Option<DateTime<Utc>>,
        #[serde(default)]
        status: Option<ApplicantStatus>,
    }

    #[derive(Deserialize)]
    struct ProfileRef {
        #[serde(rename = "_id", alias = "id", default)]
        id: Option<UserId>,
        #[serde(default)]
        email: Option<String>,
        #[serde(default)]
        about: Option<ProfileAbout>,
    }

    let entries = Option::<Vec<Entry>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            let profile = entry.applicant?;
            Some(Applicant {
                id: entry.id,
                applicant: ApplicantProfile {
                    id: profile.id?,
                    email: profile.email,
                    about: profile.about,
                },
                applied_on: entry.applied_on.unwrap_or_default(),
                status: entry.status.unwrap_or_default(),
            })
        })
        .collect())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAbout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_img: Option<String>,
}

/// Body of `GET /proposals`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalsResponse {
    #[serde(default)]
    pub found_proposals: Vec<Proposal>,
    #[serde(default)]
    pub saved_proposals: Vec<Proposal>,
}

/// Body of `GET /proposals/user`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProposalsResponse {
    #[serde(default)]
    pub found_user_proposals: Vec<Proposal>,
}

/// Body of `PUT /proposal/applicant-status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantStatusRequest {
    #[serde(rename = "proposalID")]
    pub proposal_id: ProposalId,
    #[serde(rename = "applicantID")]
    pub applicant_id: UserId,
    pub status: StatusDecision,
}
