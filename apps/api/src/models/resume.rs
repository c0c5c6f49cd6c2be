use std::fmt;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// One person's résumé content, as submitted by clients or read from disk.
///
/// The top level is strict: `contact` (with `links`), `skills`, `experience`
/// and `education` must be present. Everything inside a section entry is
/// optional here; the renderer skips entries that lack their required fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeData {
    #[serde(default)]
    pub name: Option<String>,
    pub contact: Contact,
    #[serde(default)]
    pub summary: Option<String>,
    pub skills: Vec<Skill>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub awards: Vec<Award>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub certifications: Vec<Certification>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub publications: Vec<Publication>,
}

/// Optional sections accept `null` as well as a missing key.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub links: Vec<ContactLink>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactLink {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Skill {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub items: Option<SkillItems>,
}

/// Skill items arrive either as a list or, in older documents, as a single
/// comma-joined string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillItems {
    List(Vec<String>),
    Joined(String),
}

impl SkillItems {
    /// Items joined with `", "`. Both encodings of the same list produce the same text.
    pub fn joined(&self) -> String {
        match self {
            SkillItems::List(items) => items.join(", "),
            SkillItems::Joined(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub company_url: Option<String>,
    #[serde(default)]
    pub company_description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub date_start: Option<String>,
    #[serde(default)]
    pub date_end: Option<String>,
    #[serde(default)]
    pub achievements: Option<Vec<Achievement>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Achievement {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Education {
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub date_start: Option<String>,
    #[serde(default)]
    pub date_end: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Award {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub organization_detail: Option<String>,
    #[serde(default)]
    pub organization_url: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Certification {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Publication {
    #[serde(default)]
    pub authors: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub year: Option<Year>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Publication year; older documents store it as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Year {
    Number(i64),
    Text(String),
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Year::Number(n) => write!(f, "{n}"),
            Year::Text(s) => f.write_str(s),
        }
    }
}

/// Encodings accepted by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Yaml,
}

impl DataFormat {
    /// Picks the format from a file name's extension.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(DataFormat::Json),
            "yaml" | "yml" => Some(DataFormat::Yaml),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse JSON content: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not parse YAML content: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported data file '{0}': expected .json, .yaml or .yml")]
    UnsupportedFormat(String),
}

impl ResumeData {
    /// Parses a record, failing on missing or malformed top-level keys.
    pub fn from_slice(bytes: &[u8], format: DataFormat) -> Result<Self, LoadError> {
        match format {
            DataFormat::Json => Ok(serde_json::from_slice(bytes)?),
            DataFormat::Yaml => Ok(serde_yaml::from_slice(bytes)?),
        }
    }

    /// Reads and parses a record file, choosing the format by extension.
    pub async fn from_path(path: &Path) -> Result<Self, LoadError> {
        let display = path.display().to_string();
        let format = DataFormat::from_file_name(&display)
            .ok_or_else(|| LoadError::UnsupportedFormat(display.clone()))?;
        let bytes = tokio::fs::read(path).await.map_err(|source| LoadError::Io {
            path: display,
            source,
        })?;
        Self::from_slice(&bytes, format)
    }
}
