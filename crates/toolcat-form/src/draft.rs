//! Fully-populated editable copies of catalog records.

use serde::Serialize;
use toolcat_core::{CompanyProfile, Feature, PricingDetails, PricingType, ToolRecord};

/// Editable tool record. Unlike [`ToolRecord`] nothing here is ever absent:
/// optional wire fields are replaced by empty strings, empty lists or zeroed
/// pricing details, so the form always has something to bind to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub website: String,
    pub image: String,
    pub thumbnail: String,
    pub categories: Vec<String>,
    pub pricing_type: PricingType,
    pub pricing_details: PricingDetails,
    pub features: Vec<Feature>,
    pub use_cases: Vec<String>,
    pub compatible_platforms: Vec<String>,
    pub integrations: Vec<String>,
    pub api_available: bool,
    pub api_documentation: String,
    pub creator: String,
    pub creator_website: String,
    pub version: String,
    pub tags: Vec<String>,
}

impl Default for ToolDraft {
    /// Blank draft for the new-tool flow: one empty feature and one empty use
    /// case so the form opens with a row to type into.
    fn default() -> Self {
        Self {
            id: None,
            title: String::new(),
            description: String::new(),
            website: String::new(),
            image: String::new(),
            thumbnail: String::new(),
            categories: Vec::new(),
            pricing_type: PricingType::Free,
            pricing_details: PricingDetails::default(),
            features: vec![Feature::default()],
            use_cases: vec![String::new()],
            compatible_platforms: Vec::new(),
            integrations: Vec::new(),
            api_available: false,
            api_documentation: String::new(),
            creator: String::new(),
            creator_website: String::new(),
            version: String::new(),
            tags: Vec::new(),
        }
    }
}

impl ToolDraft {
    /// Seed a draft from a fetched, selected or extracted record. Absent
    /// features and use cases fall back to the same single blank row as a
    /// new draft; an explicitly empty list stays empty.
    pub fn from_record(record: &ToolRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            website: record.website.clone(),
            image: record.image.clone(),
            thumbnail: record.thumbnail.clone(),
            categories: record.categories.clone(),
            pricing_type: record.pricing_type,
            pricing_details: record.pricing_details.unwrap_or_default(),
            features: record
                .features
                .clone()
                .unwrap_or_else(|| vec![Feature::default()]),
            use_cases: record
                .use_cases
                .clone()
                .unwrap_or_else(|| vec![String::new()]),
            compatible_platforms: record.compatible_platforms.clone(),
            integrations: record.integrations.clone(),
            api_available: record.api_available,
            api_documentation: record.api_documentation.clone().unwrap_or_default(),
            creator: record.creator.clone().unwrap_or_default(),
            creator_website: record.creator_website.clone().unwrap_or_default(),
            version: record.version.clone().unwrap_or_default(),
            tags: record.tags.clone(),
        }
    }

    /// Copy with blank list entries dropped. Kept entries are not trimmed.
    pub fn cleaned(&self) -> Self {
        Self {
            categories: drop_blank(&self.categories),
            features: self
                .features
                .iter()
                .filter(|f| !f.is_blank())
                .cloned()
                .collect(),
            use_cases: drop_blank(&self.use_cases),
            compatible_platforms: drop_blank(&self.compatible_platforms),
            integrations: drop_blank(&self.integrations),
            tags: drop_blank(&self.tags),
            ..self.clone()
        }
    }
}

/// Copy of a company profile with fully blank news rows dropped.
pub fn cleaned_company(company: &CompanyProfile) -> CompanyProfile {
    CompanyProfile {
        news: company
            .news
            .iter()
            .filter(|n| !n.is_blank())
            .cloned()
            .collect(),
        ..company.clone()
    }
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn drop_blank(values: &[String]) -> Vec<String> {
    values.iter().filter(|v| !is_blank(v)).cloned().collect()
}
