//! Catalog domain model shared by the API client and the form pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub const CRATE_NAME: &str = "toolcat-core";

/// Platforms offered as one-click toggles in the edit form.
pub const COMMON_PLATFORMS: &[&str] = &[
    "Web",
    "iOS",
    "Android",
    "Windows",
    "macOS",
    "Linux",
    "Chrome Extension",
    "Firefox Extension",
    "Slack",
    "Discord",
];

/// Integrations offered as one-click toggles in the edit form.
pub const COMMON_INTEGRATIONS: &[&str] = &[
    "Slack",
    "Discord",
    "Teams",
    "Google Workspace",
    "Microsoft Office",
    "Zapier",
    "Notion",
    "Trello",
    "GitHub",
    "GitLab",
    "Figma",
];

/// Treats an explicit JSON `null` the same as an absent field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PricingType {
    #[default]
    Free,
    Freemium,
    Paid,
    Subscription,
}

impl PricingType {
    pub const ALL: [PricingType; 4] = [
        PricingType::Free,
        PricingType::Freemium,
        PricingType::Paid,
        PricingType::Subscription,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PricingType::Free => "Free",
            PricingType::Freemium => "Freemium",
            PricingType::Paid => "Paid",
            PricingType::Subscription => "Subscription",
        }
    }

    pub fn is_free(self) -> bool {
        self == PricingType::Free
    }
}

impl fmt::Display for PricingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown pricing type `{0}` (expected Free, Freemium, Paid or Subscription)")]
pub struct UnknownPricingType(pub String);

impl FromStr for PricingType {
    type Err = UnknownPricingType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PricingType::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPricingType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingDetails {
    #[serde(deserialize_with = "null_as_default")]
    pub starting_price: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub has_free_trial: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub trial_days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Feature {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
}

impl Feature {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// A feature only counts as empty when both halves are blank.
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.description.trim().is_empty()
    }
}

/// A catalog entry as the API returns it. Extraction results may be partial,
/// so every field tolerates being absent or `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub website: String,
    #[serde(deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(deserialize_with = "null_as_default")]
    pub thumbnail: String,
    #[serde(deserialize_with = "null_as_default")]
    pub categories: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub pricing_type: PricingType,
    pub pricing_details: Option<PricingDetails>,
    pub features: Option<Vec<Feature>>,
    pub use_cases: Option<Vec<String>>,
    #[serde(deserialize_with = "null_as_default")]
    pub compatible_platforms: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub integrations: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub api_available: bool,
    pub api_documentation: Option<String>,
    pub creator: Option<String>,
    pub creator_website: Option<String>,
    pub version: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

impl ToolRecord {
    /// Case-insensitive substring match over title, description and creator.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self
                .creator
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Founder {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub linkedin: String,
    #[serde(deserialize_with = "null_as_default")]
    pub twitter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsItem {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
}

impl NewsItem {
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.date.trim().is_empty() && self.url.trim().is_empty()
    }
}

/// Company behind a tool, submitted alongside the tool record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyProfile {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(deserialize_with = "null_as_default")]
    pub revenue: String,
    #[serde(deserialize_with = "null_as_default")]
    pub valuation: String,
    #[serde(deserialize_with = "null_as_default")]
    pub funding: String,
    #[serde(deserialize_with = "null_as_default")]
    pub linkedin: String,
    #[serde(deserialize_with = "null_as_default")]
    pub twitter: String,
    #[serde(deserialize_with = "null_as_default")]
    pub founder: Founder,
    #[serde(deserialize_with = "null_as_default")]
    pub news: Vec<NewsItem>,
}

/// Response envelope used by every catalog API endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Human-readable reason for a rejected request.
    pub fn failure_message(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "Unknown API error".to_string())
    }
}
