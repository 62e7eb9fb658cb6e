use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub full_name: String,
    pub headline: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub institution: String,
    pub degree: String,
    pub field: Option<String>,
    pub date_start: NaiveDate,
    pub date_end: Option<NaiveDate>,
    pub gpa: Option<f64>,
    #[serde(default)]
    pub honors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub company: String,
    pub role: String,
    pub location: Option<String>,
    pub date_start: NaiveDate,
    /// `None` for a current position.
    pub date_end: Option<NaiveDate>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGroup {
    pub category: String,
    pub items: Vec<String>,
}

/// The editable body of a CV, stored as one JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvContent {
    pub personal: PersonalInfo,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub skills: Vec<SkillGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvDocument {
    pub id: Uuid,
    pub user_id: Uuid,
    pub template_id: String,
    pub content: CvContent,
    pub updated_at: DateTime<Utc>,
}

impl CvDocument {
    pub fn new(user_id: Uuid, template_id: impl Into<String>, content: CvContent) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            template_id: template_id.into(),
            content,
            updated_at: Utc::now(),
        }
    }
}

/// Listing row for a user's CVs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvSummary {
    pub id: Uuid,
    pub template_id: String,
    pub full_name: String,
    pub version: i32,
    pub updated_at: DateTime<Utc>,
}
