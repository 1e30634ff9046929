//! Submission rules for tool drafts and company profiles.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use toolcat_core::CompanyProfile;
use url::Url;

use crate::draft::{is_blank, ToolDraft};

pub const INVALID_URL: &str = "Must be a valid URL";
pub const CATEGORY_REQUIRED: &str = "At least one category is required";
pub const COMPANY_NAME_REQUIRED: &str = "Company name is required";
pub const INVALID_PRICE: &str = "Starting price must be a non-negative number";

/// Error messages keyed by dotted field path (`website`, `company.news.0.url`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.insert(path.into(), message.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (path, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{path}: {message}")?;
        }
        Ok(())
    }
}

pub fn is_valid_url(value: &str) -> bool {
    Url::parse(value).is_ok()
}

#[derive(Default)]
struct Checker {
    errors: FieldErrors,
}

impl Checker {
    /// Blank means "not provided" and passes.
    fn optional_url(&mut self, path: &str, value: &str) {
        if !is_blank(value) && !is_valid_url(value) {
            self.errors.insert(path, INVALID_URL);
        }
    }

    fn required_url(&mut self, path: &str, value: &str) {
        if is_blank(value) || !is_valid_url(value) {
            self.errors.insert(path, INVALID_URL);
        }
    }

    fn required_text(&mut self, path: &str, value: &str, message: &str) {
        if is_blank(value) {
            self.errors.insert(path, message);
        }
    }

    fn at_least_one(&mut self, path: &str, values: &[String], message: &str) {
        if values.iter().all(|v| is_blank(v)) {
            self.errors.insert(path, message);
        }
    }

    fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Check a draft (and its company profile, when attached) against the
/// submission rules. Hidden sections are only checked while visible.
/// Blank news rows are skipped, so the live profile can be passed and
/// `company.news.{i}` keeps the index the row is edited at.
pub fn validate(draft: &ToolDraft, company: Option<&CompanyProfile>) -> Result<(), FieldErrors> {
    let mut check = Checker::default();

    check.optional_url("website", &draft.website);
    check.optional_url("image", &draft.image);
    check.optional_url("thumbnail", &draft.thumbnail);
    check.optional_url("creator_website", &draft.creator_website);
    check.at_least_one("categories", &draft.categories, CATEGORY_REQUIRED);

    if !draft.pricing_type.is_free() {
        let price = draft.pricing_details.starting_price;
        if !price.is_finite() || price < 0.0 {
            check
                .errors
                .insert("pricing_details.starting_price", INVALID_PRICE);
        }
    }

    if draft.api_available {
        check.optional_url("api_documentation", &draft.api_documentation);
    }

    if let Some(company) = company {
        check.required_text("company.name", &company.name, COMPANY_NAME_REQUIRED);
        check.optional_url("company.linkedin", &company.linkedin);
        check.optional_url("company.twitter", &company.twitter);
        check.optional_url("company.founder.linkedin", &company.founder.linkedin);
        check.optional_url("company.founder.twitter", &company.founder.twitter);
        for (i, item) in company.news.iter().enumerate() {
            if item.is_blank() {
                continue;
            }
            check.required_url(&format!("company.news.{i}.url"), &item.url);
        }
    }

    check.finish()
}
