use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BACKGROUND_COLOR: &str = "#4F46E5";
pub const DEFAULT_GRADIENT_START: &str = "#4F46E5";
pub const DEFAULT_GRADIENT_END: &str = "#7C3AED";

/// Networks pre-populated (empty) when a submission carries no social links.
pub const DEFAULT_SOCIAL_NETWORKS: [&str; 4] = ["github", "linkedin", "twitter", "website"];

/// The public profile document. Replaced wholesale on every save, so any field
/// missing from a submission falls back to the `Default` value below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Portfolio {
    pub slug: String,
    pub name: String,
    pub title: String,
    pub bio: String,
    pub image: Option<String>,
    pub skills: Vec<String>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub projects: Vec<String>,
    pub social_links: BTreeMap<String, String>,
    pub use_gradient: bool,
    pub background_color: String,
    pub gradient_start: String,
    pub gradient_end: String,
}

impl Default for Portfolio {
    fn default() -> Self {
        Self {
            slug: String::new(),
            name: String::new(),
            title: String::new(),
            bio: String::new(),
            image: None,
            skills: Vec::new(),
            experience: Vec::new(),
            education: Vec::new(),
            projects: Vec::new(),
            social_links: default_social_links(),
            use_gradient: false,
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            gradient_start: DEFAULT_GRADIENT_START.to_string(),
            gradient_end: DEFAULT_GRADIENT_END.to_string(),
        }
    }
}

pub fn default_social_links() -> BTreeMap<String, String> {
    DEFAULT_SOCIAL_NETWORKS
        .iter()
        .map(|network| (network.to_string(), String::new()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background<'a> {
    Solid(&'a str),
    Gradient { start: &'a str, end: &'a str },
}

impl Portfolio {
    pub fn background(&self) -> Background<'_> {
        if self.use_gradient {
            Background::Gradient {
                start: &self.gradient_start,
                end: &self.gradient_end,
            }
        } else {
            Background::Solid(&self.background_color)
        }
    }

    /// CSS `background` value for the public page.
    pub fn background_css(&self) -> String {
        match self.background() {
            Background::Solid(color) => color.to_string(),
            Background::Gradient { start, end } => {
                format!("linear-gradient(135deg, {start}, {end})")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub description: String,
    #[serde(with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    /// `None` means the position is ongoing.
    #[serde(with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
}

impl Experience {
    /// An untouched form row: no text and no dates.
    pub fn is_blank(&self) -> bool {
        [&self.title, &self.company, &self.description]
            .iter()
            .all(|s| s.trim().is_empty())
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub school: String,
    pub degree: String,
    pub field: String,
    pub description: String,
    #[serde(with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
}

impl Education {
    pub fn is_blank(&self) -> bool {
        [&self.school, &self.degree, &self.field, &self.description]
            .iter()
            .all(|s| s.trim().is_empty())
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

/// Optional dates as `YYYY-MM-DD`. Also accepts RFC 3339 timestamps (date part
/// kept) and treats `null` or an empty string as absent.
pub mod lenient_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format(FORMAT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse(s)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid date '{s}', expected YYYY-MM-DD"))),
        }
    }

    pub fn parse(s: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(s, FORMAT)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
    }
}
