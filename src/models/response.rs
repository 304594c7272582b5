use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body returned by `POST /upload` on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub data: ParsedResume,
}

impl UploadResponse {
    pub fn new(data: ParsedResume) -> Self {
        Self { data }
    }
}

/// Structured fields extracted from a resume.
///
/// The shape is assumed rather than validated: a field that is absent,
/// `null` or of the wrong type falls back to its default instead of
/// failing the whole payload. Scalars are accepted where lists are
/// expected, and numbers or booleans where text is. Emptiness is checked
/// at render time. Maps keep the order in which categories and platforms
/// were found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedResume {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_record")]
    pub contact: ContactInfo,
    #[serde(default, deserialize_with = "lenient_records")]
    pub education: Vec<EducationEntry>,
    #[serde(default, deserialize_with = "lenient_skills")]
    pub skills: IndexMap<String, Vec<String>>,
    #[serde(default, deserialize_with = "lenient_records")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default, deserialize_with = "lenient_records")]
    pub projects: Vec<ProjectEntry>,
    #[serde(default, deserialize_with = "lenient_record")]
    pub competitive_programming: CompetitiveProgramming,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub linkedin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub degree: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub year: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub institution: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub grade: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dates: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub technologies: String,
}

impl ProjectEntry {
    /// Comma-separated technologies, trimmed, blanks dropped.
    pub fn technology_list(&self) -> Vec<&str> {
        self.technologies
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitiveProgramming {
    #[serde(default, deserialize_with = "lenient_profiles")]
    pub profiles: IndexMap<String, CodingProfile>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodingProfile {
    #[serde(default, deserialize_with = "lenient_string")]
    pub username: String,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub rating: Option<String>,
}

/// Text form of a JSON scalar. Arrays, objects and `null` have none.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_list(value: Value) -> Vec<String> {
    let items = match value {
        Value::Array(items) => items,
        other => vec![other],
    };
    items
        .into_iter()
        .filter_map(scalar_text)
        .filter(|s| !s.is_empty())
        .collect()
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

// Ratings arrive as strings from the parser but other producers send numbers.
fn lenient_rating<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?).filter(|s| !s.is_empty()))
}

fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string_list(Value::deserialize(deserializer)?))
}

fn lenient_record<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).unwrap_or_default())
}

// A lone object counts as a one-entry list; entries that are not objects are skipped.
fn lenient_records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn lenient_skills<'de, D>(deserializer: D) -> Result<IndexMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(categories) = Value::deserialize(deserializer)? else {
        return Ok(IndexMap::new());
    };
    Ok(categories
        .into_iter()
        .map(|(category, skills)| (category, string_list(skills)))
        .collect())
}

fn lenient_profiles<'de, D>(deserializer: D) -> Result<IndexMap<String, CodingProfile>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(platforms) = Value::deserialize(deserializer)? else {
        return Ok(IndexMap::new());
    };
    Ok(platforms
        .into_iter()
        .filter(|(_, profile)| profile.is_object())
        .filter_map(|(platform, profile)| {
            serde_json::from_value(profile).ok().map(|p| (platform, p))
        })
        .collect())
}
