use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Score used when the model reports none.
pub const DEFAULT_SCORE: i32 = 0;
/// Readability used when the model reports none. Only absence triggers it.
pub const DEFAULT_READABILITY_SCORE: i32 = 50;
/// Per-section score used when a section key is missing.
pub const DEFAULT_SECTION_SCORE: i32 = 0;

/// ATS compatibility verdict, stored and served as the literal strings
/// `"true"` / `"false"`. Anything but an explicit `"true"` is a fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtsVerdict {
    #[serde(rename = "true")]
    Friendly,
    #[default]
    #[serde(rename = "false")]
    NotFriendly,
}

impl AtsVerdict {
    pub fn from_raw(raw: &str) -> Self {
        if raw == "true" {
            AtsVerdict::Friendly
        } else {
            AtsVerdict::NotFriendly
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AtsVerdict::Friendly => "true",
            AtsVerdict::NotFriendly => "false",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: Option<String>,
    pub branch: Option<String>,
    pub university: Option<String>,
    pub year: Option<String>,
    pub cgpa: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub role: String,
    pub company: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skills {
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub tools: Vec<String>,
}

/// Fixed-key section breakdown. Keys serialize capitalised (`"Education"`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SectionWiseScore {
    pub education: i32,
    pub experience: i32,
    pub skills: i32,
    pub projects: i32,
    pub achievements: i32,
    pub other: i32,
}

impl Default for SectionWiseScore {
    fn default() -> Self {
        Self {
            education: DEFAULT_SECTION_SCORE,
            experience: DEFAULT_SECTION_SCORE,
            skills: DEFAULT_SECTION_SCORE,
            projects: DEFAULT_SECTION_SCORE,
            achievements: DEFAULT_SECTION_SCORE,
            other: DEFAULT_SECTION_SCORE,
        }
    }
}

/// The model-derived part of a record.
///
/// `Default` is the fallback table for every field: the normalizer starts from
/// it and overwrites only what it can read from the model payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysis {
    pub score: i32,
    pub missing_keywords: Vec<String>,
    pub suggested_jobs: Vec<String>,
    pub readability_score: i32,
    pub grammar_issues: String,
    pub ats_friendly: AtsVerdict,
    pub detailed_description: String,
    pub personal_info: PersonalInfo,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub skills: Skills,
    pub section_wise_score: SectionWiseScore,
}

impl Default for ResumeAnalysis {
    fn default() -> Self {
        Self {
            score: DEFAULT_SCORE,
            missing_keywords: Vec::new(),
            suggested_jobs: Vec::new(),
            readability_score: DEFAULT_READABILITY_SCORE,
            grammar_issues: String::new(),
            ats_friendly: AtsVerdict::NotFriendly,
            detailed_description: String::new(),
            personal_info: PersonalInfo::default(),
            education: Vec::new(),
            experience: Vec::new(),
            skills: Skills::default(),
            section_wise_score: SectionWiseScore::default(),
        }
    }
}

/// One persisted analysis. Insert-only: re-analysis creates a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub source_link: String,
    pub extracted_text: String,
    #[serde(flatten)]
    pub analysis: ResumeAnalysis,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn new(
        owner_id: Uuid,
        source_link: String,
        extracted_text: String,
        analysis: ResumeAnalysis,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            source_link,
            extracted_text,
            analysis,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub source_link: String,
    pub extracted_text: String,
    pub score: i32,
    pub missing_keywords: Vec<String>,
    pub suggested_jobs: Vec<String>,
    pub readability_score: i32,
    pub grammar_issues: String,
    pub ats_friendly: String,
    pub detailed_description: String,
    pub personal_info: Json<PersonalInfo>,
    pub education: Json<Vec<EducationEntry>>,
    pub experience: Json<Vec<ExperienceEntry>>,
    pub skills: Json<Skills>,
    pub section_wise_score: Json<SectionWiseScore>,
    pub created_at: DateTime<Utc>,
}

impl From<ResumeRow> for AnalysisRecord {
    fn from(row: ResumeRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.user_id,
            source_link: row.source_link,
            extracted_text: row.extracted_text,
            analysis: ResumeAnalysis {
                score: row.score,
                missing_keywords: row.missing_keywords,
                suggested_jobs: row.suggested_jobs,
                readability_score: row.readability_score,
                grammar_issues: row.grammar_issues,
                ats_friendly: AtsVerdict::from_raw(&row.ats_friendly),
                detailed_description: row.detailed_description,
                personal_info: row.personal_info.0,
                education: row.education.0,
                experience: row.experience.0,
                skills: row.skills.0,
                section_wise_score: row.section_wise_score.0,
            },
            created_at: row.created_at,
        }
    }
}
