//! Result Normalizer — turns the model's free-form reply into a fully populated
//! `ResumeAnalysis`.
//!
//! The reply is untrusted input. It may be wrapped in code fences, prefaced with
//! commentary, truncated, or carry fields of the wrong type. Each field is read
//! on its own and falls back to its `ResumeAnalysis::default()` value when it is
//! absent or malformed; one bad field never invalidates its siblings.
//!
//! `normalize` has no error path.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::models::analysis::{
    AtsVerdict, EducationEntry, ExperienceEntry, PersonalInfo, ResumeAnalysis, SectionWiseScore,
    Skills,
};

/// Overall ATS score range.
pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 100;

const FENCE: &str = "```";
/// Separator used when the model reports grammar issues as a list.
const GRAMMAR_ISSUE_SEPARATOR: &str = "; ";

/// What could be recovered from a raw model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelPayload {
    Parsed(Map<String, Value>),
    Unparseable,
}

impl ModelPayload {
    /// Strips code fences, then tries the whole text as one JSON object. If that
    /// fails, scans for the first balanced `{...}` span that parses as an object.
    pub fn parse(raw: &str) -> Self {
        let unfenced = strip_code_fences(raw);
        let text = unfenced.trim();
        if text.is_empty() {
            return ModelPayload::Unparseable;
        }

        if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(text) {
            return ModelPayload::Parsed(fields);
        }

        match find_embedded_object(text) {
            Some(fields) => {
                debug!("Recovered JSON object embedded in surrounding prose");
                ModelPayload::Parsed(fields)
            }
            None => ModelPayload::Unparseable,
        }
    }
}

/// Normalizes a raw model reply into a complete analysis.
pub fn normalize(raw: &str) -> ResumeAnalysis {
    match ModelPayload::parse(raw) {
        ModelPayload::Parsed(fields) => normalize_fields(&fields),
        ModelPayload::Unparseable => {
            warn!(
                reply_len = raw.len(),
                "Model reply contained no usable JSON object, storing defaults"
            );
            ResumeAnalysis::default()
        }
    }
}

fn normalize_fields(fields: &Map<String, Value>) -> ResumeAnalysis {
    let defaults = ResumeAnalysis::default();

    ResumeAnalysis {
        score: read_int(fields.get("score"))
            .map(|s| s.clamp(MIN_SCORE, MAX_SCORE))
            .unwrap_or(defaults.score),
        missing_keywords: read_string_list(fields.get("missingKeywords"))
            .unwrap_or(defaults.missing_keywords),
        suggested_jobs: read_string_list(fields.get("suggestedJobs"))
            .unwrap_or(defaults.suggested_jobs),
        readability_score: read_int(fields.get("readabilityScore"))
            .unwrap_or(defaults.readability_score),
        grammar_issues: read_grammar_issues(fields.get("grammarIssues"))
            .unwrap_or(defaults.grammar_issues),
        ats_friendly: fields
            .get("atsFriendly")
            .and_then(Value::as_str)
            .map(AtsVerdict::from_raw)
            .unwrap_or(defaults.ats_friendly),
        detailed_description: fields
            .get("detailedDescription")
            .and_then(Value::as_str)
            .map(clean_text)
            .unwrap_or(defaults.detailed_description),
        personal_info: fields
            .get("personalInfo")
            .and_then(Value::as_object)
            .map(read_personal_info)
            .unwrap_or(defaults.personal_info),
        education: fields
            .get("education")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(read_education)
                    .collect()
            })
            .unwrap_or(defaults.education),
        experience: fields
            .get("experience")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(read_experience)
                    .collect()
            })
            .unwrap_or(defaults.experience),
        skills: fields
            .get("skills")
            .and_then(Value::as_object)
            .map(read_skills)
            .unwrap_or(defaults.skills),
        section_wise_score: fields
            .get("sectionWiseScore")
            .and_then(Value::as_object)
            .map(read_section_scores)
            .unwrap_or(defaults.section_wise_score),
    }
}

fn read_personal_info(obj: &Map<String, Value>) -> PersonalInfo {
    PersonalInfo {
        name: read_string(obj.get("name")),
        email: read_string(obj.get("email")),
        phone: read_string(obj.get("phone")),
        location: read_string(obj.get("location")),
    }
}

fn read_education(obj: &Map<String, Value>) -> EducationEntry {
    EducationEntry {
        degree: read_string(obj.get("degree")),
        branch: read_string(obj.get("branch")),
        university: read_string(obj.get("university")),
        year: read_string(obj.get("year")),
        cgpa: read_string(obj.get("cgpa")),
    }
}

fn read_experience(obj: &Map<String, Value>) -> ExperienceEntry {
    ExperienceEntry {
        role: read_string(obj.get("role")).unwrap_or_default(),
        company: read_string(obj.get("company")).unwrap_or_default(),
        description: read_string(obj.get("description")).unwrap_or_default(),
    }
}

fn read_skills(obj: &Map<String, Value>) -> Skills {
    Skills {
        technical_skills: read_string_list(obj.get("technicalSkills")).unwrap_or_default(),
        soft_skills: read_string_list(obj.get("softSkills")).unwrap_or_default(),
        tools: read_string_list(obj.get("tools")).unwrap_or_default(),
    }
}

fn read_section_scores(obj: &Map<String, Value>) -> SectionWiseScore {
    let defaults = SectionWiseScore::default();
    SectionWiseScore {
        education: read_int(obj.get("Education")).unwrap_or(defaults.education),
        experience: read_int(obj.get("Experience")).unwrap_or(defaults.experience),
        skills: read_int(obj.get("Skills")).unwrap_or(defaults.skills),
        projects: read_int(obj.get("Projects")).unwrap_or(defaults.projects),
        achievements: read_int(obj.get("Achievements")).unwrap_or(defaults.achievements),
        other: read_int(obj.get("Other")).unwrap_or(defaults.other),
    }
}

/// Accepts JSON numbers and numeric strings. Fractions are rounded, out-of-range
/// values saturate to `i32`.
fn read_int(value: Option<&Value>) -> Option<i32> {
    let number = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() {
        return None;
    }
    Some(number.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32)
}

/// Non-blank strings (trimmed) and numbers (e.g. `"year": 2022`).
fn read_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let cleaned = clean_text(s);
            (!cleaned.is_empty()).then_some(cleaned)
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `None` unless the value is an array. Elements that are not readable as
/// strings are dropped.
fn read_string_list(value: Option<&Value>) -> Option<Vec<String>> {
    value?
        .as_array()
        .map(|items| items.iter().filter_map(|v| read_string(Some(v))).collect())
}

fn read_grammar_issues(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(clean_text(s)),
        Value::Array(_) => {
            read_string_list(value).map(|issues| issues.join(GRAMMAR_ISSUE_SEPARATOR))
        }
        _ => None,
    }
}

/// Drops NUL characters, which PostgreSQL refuses in `TEXT` and `JSONB`, and trims.
pub fn clean_text(text: &str) -> String {
    text.replace('\0', "").trim().to_string()
}

/// Removes every ```` ``` ```` marker along with a `json` language tag that
/// directly follows one.
fn strip_code_fences(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for (i, piece) in raw.split(FENCE).enumerate() {
        let piece = if i == 0 {
            piece
        } else {
            piece
                .strip_prefix("json")
                .or_else(|| piece.strip_prefix("JSON"))
                .unwrap_or(piece)
        };
        out.push_str(piece);
    }
    out
}

/// Returns the first balanced `{...}` span in `text` that parses as an object.
/// A brace whose span never closes or does not parse is treated as prose, and
/// the scan resumes at the next `{`.
fn find_embedded_object(text: &str) -> Option<Map<String, Value>> {
    let mut cursor = 0;
    while let Some(found) = text[cursor..].find('{') {
        let start = cursor + found;
        if let Some(end) = balanced_object_end(text, start) {
            if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(&text[start..end]) {
                return Some(fields);
            }
        }
        cursor = start + 1;
    }
    None
}

/// Byte index one past the brace closing the object opened at `start`.
/// Braces inside string literals are ignored. `None` if the object never closes.
fn balanced_object_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if *byte == b'\\' {
                escaped = true;
            } else if *byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(start + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}
