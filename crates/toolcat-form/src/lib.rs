//! Draft reconciliation + submission pipeline for the tool edit form.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use toolcat_client::{ApiClient, ApiError, Catalog, ExtractedListing};
use toolcat_core::{CompanyProfile, ToolRecord};

mod draft;
mod form;
mod validate;

pub use draft::{cleaned_company, ToolDraft};
pub use form::{
    CompanyField, FeatureField, NewsField, PendingInputs, TagList, TextField, ToolForm,
    SUBMIT_ERROR_FIELD,
};
pub use validate::{
    is_valid_url, validate, FieldErrors, CATEGORY_REQUIRED, COMPANY_NAME_REQUIRED, INVALID_PRICE,
    INVALID_URL,
};

pub const CRATE_NAME: &str = "toolcat-form";

/// Read access to records fetched elsewhere.
pub trait RecordLookup {
    fn records(&self) -> &[ToolRecord];
    fn selected(&self) -> Option<&ToolRecord>;

    fn find(&self, id: &str) -> Option<&ToolRecord> {
        self.records().iter().find(|r| r.id.as_deref() == Some(id))
    }
}

/// Turns a website URL into a proposed catalog entry.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<ExtractedListing, ApiError>;
}

/// Persists a cleaned, validated submission with exactly one write.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, submission: &Submission) -> Result<(), ApiError>;
}

/// Request body: tool fields at the top level, company profile alongside.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionPayload {
    #[serde(flatten)]
    pub tool: ToolDraft,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyProfile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// Present for updates, absent for creates.
    pub id: Option<String>,
    pub payload: SubmissionPayload,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("a submission is already in flight")]
    Busy,
    #[error("validation failed: {0}")]
    Invalid(FieldErrors),
    #[error(transparent)]
    Remote(#[from] ApiError),
}

impl RecordLookup for Catalog {
    fn records(&self) -> &[ToolRecord] {
        self.tools()
    }

    fn selected(&self) -> Option<&ToolRecord> {
        Catalog::selected(self)
    }
}

#[async_trait]
impl Extractor for ApiClient {
    async fn extract(&self, url: &str) -> Result<ExtractedListing, ApiError> {
        ApiClient::extract(self, url).await
    }
}

#[async_trait]
impl Submitter for ApiClient {
    async fn submit(&self, submission: &Submission) -> Result<(), ApiError> {
        match submission.id.as_deref() {
            Some(id) => self.update_tool(id, &submission.payload).await,
            None => self.create_tool(&submission.payload).await,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Records every submission and answers with a canned result.
    #[derive(Default)]
    pub struct RecordingSubmitter {
        pub calls: Mutex<Vec<Submission>>,
        pub fail_status: Option<u16>,
    }

    impl RecordingSubmitter {
        pub fn failing(status: u16) -> Self {
            Self {
                fail_status: Some(status),
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<Submission> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Submitter for RecordingSubmitter {
        async fn submit(&self, submission: &Submission) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(submission.clone());
            match self.fail_status {
                Some(status) => Err(ApiError::HttpStatus {
                    status,
                    url: "http://api.test/create".to_string(),
                }),
                None => Ok(()),
            }
        }
    }

    /// Never answers; used to drop a submission mid-flight.
    pub struct StalledSubmitter;

    #[async_trait]
    impl Submitter for StalledSubmitter {
        async fn submit(&self, _submission: &Submission) -> Result<(), ApiError> {
            std::future::pending::<Result<(), ApiError>>().await
        }
    }

    pub struct CannedExtractor(pub Option<ExtractedListing>);

    #[async_trait]
    impl Extractor for CannedExtractor {
        async fn extract(&self, _url: &str) -> Result<ExtractedListing, ApiError> {
            self.0
                .clone()
                .ok_or_else(|| ApiError::Rejected("could not read page".to_string()))
        }
    }

    pub struct StaticLookup {
        pub records: Vec<ToolRecord>,
        pub selected: Option<ToolRecord>,
    }

    impl RecordLookup for StaticLookup {
        fn records(&self) -> &[ToolRecord] {
            &self.records
        }

        fn selected(&self) -> Option<&ToolRecord> {
            self.selected.as_ref()
        }
    }
}
