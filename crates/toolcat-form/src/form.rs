//! The tool edit form: one draft, its scratch inputs, and the submit cycle.

use toolcat_client::{ApiError, ExtractedListing};
use toolcat_core::{CompanyProfile, Feature, NewsItem, PricingType, ToolRecord};
use tracing::{debug, info, warn};

use crate::draft::{cleaned_company, ToolDraft};
use crate::validate::{validate, FieldErrors};
use crate::{Extractor, RecordLookup, Submission, SubmissionPayload, SubmitError, Submitter};

/// Field that carries remote failures so they render inline.
pub const SUBMIT_ERROR_FIELD: &str = "title";

/// The deduplicated string lists edited through a pending input box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagList {
    Categories,
    Tags,
    Platforms,
    Integrations,
}

impl TagList {
    pub const ALL: [TagList; 4] = [
        TagList::Categories,
        TagList::Tags,
        TagList::Platforms,
        TagList::Integrations,
    ];
}

/// Half-typed values for each [`TagList`]; never part of the submitted record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingInputs {
    pub category: String,
    pub tag: String,
    pub platform: String,
    pub integration: String,
}

impl PendingInputs {
    pub fn get(&self, list: TagList) -> &str {
        match list {
            TagList::Categories => &self.category,
            TagList::Tags => &self.tag,
            TagList::Platforms => &self.platform,
            TagList::Integrations => &self.integration,
        }
    }

    fn slot(&mut self, list: TagList) -> &mut String {
        match list {
            TagList::Categories => &mut self.category,
            TagList::Tags => &mut self.tag,
            TagList::Platforms => &mut self.platform,
            TagList::Integrations => &mut self.integration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Description,
    Website,
    Image,
    Thumbnail,
    Creator,
    CreatorWebsite,
    Version,
    ApiDocumentation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureField {
    Name,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyField {
    Name,
    Location,
    Revenue,
    Valuation,
    Funding,
    Linkedin,
    Twitter,
    FounderName,
    FounderTitle,
    FounderLinkedin,
    FounderTwitter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsField {
    Title,
    Date,
    Url,
}

/// Resets `flag` however the submit future ends, including being dropped.
struct InFlight<'a>(&'a mut bool);

impl<'a> InFlight<'a> {
    fn start(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

#[derive(Debug, Clone, Default)]
pub struct ToolForm {
    draft: ToolDraft,
    company: Option<CompanyProfile>,
    pending: PendingInputs,
    errors: FieldErrors,
    submitting: bool,
    route_id: Option<String>,
    awaiting_lookup: bool,
}

impl ToolForm {
    /// Blank form for adding a new tool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Form for editing `record`.
    pub fn edit(record: &ToolRecord) -> Self {
        Self {
            draft: ToolDraft::from_record(record),
            route_id: record.id.clone(),
            ..Self::default()
        }
    }

    /// Open the form the way the edit route does: a selected record wins,
    /// otherwise `route_id` is looked up among the fetched records. When the
    /// id is not there yet the form stays blank until [`Self::sync_with_lookup`]
    /// finds it.
    pub fn init<L: RecordLookup + ?Sized>(lookup: &L, route_id: Option<&str>) -> Self {
        let mut form = Self {
            route_id: route_id.map(str::to_string),
            ..Self::default()
        };
        if let Some(selected) = lookup.selected() {
            form.draft = ToolDraft::from_record(selected);
        } else if route_id.is_some() {
            form.awaiting_lookup = true;
            form.sync_with_lookup(lookup);
        }
        form
    }

    /// Seed the draft from the lookup once the routed record shows up.
    /// Returns true when this call seeded it.
    pub fn sync_with_lookup<L: RecordLookup + ?Sized>(&mut self, lookup: &L) -> bool {
        if !self.awaiting_lookup {
            return false;
        }
        let Some(id) = self.route_id.as_deref() else {
            return false;
        };
        match lookup.find(id) {
            Some(record) => {
                debug!(id, "seeding draft from fetched records");
                self.draft = ToolDraft::from_record(record);
                self.awaiting_lookup = false;
                true
            }
            None => false,
        }
    }

    pub fn draft(&self) -> &ToolDraft {
        &self.draft
    }

    pub fn company(&self) -> Option<&CompanyProfile> {
        self.company.as_ref()
    }

    pub fn pending_inputs(&self) -> &PendingInputs {
        &self.pending
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_awaiting_lookup(&self) -> bool {
        self.awaiting_lookup
    }

    /// Id the next submission updates; `None` means it creates.
    pub fn record_id(&self) -> Option<&str> {
        self.route_id.as_deref().or(self.draft.id.as_deref())
    }

    /// Replace the whole draft with an extraction result. Nothing from the
    /// previous draft survives, edits included.
    pub fn apply_extraction(&mut self, listing: ExtractedListing) {
        debug!(title = %listing.tool.title, "resetting draft from extraction result");
        self.draft = ToolDraft::from_record(&listing.tool);
        self.company = listing.company;
        self.errors.clear();
        self.awaiting_lookup = false;
    }

    /// Run an extraction and reset the draft from it. A failed extraction
    /// leaves the draft as it was.
    pub async fn extract_from<E: Extractor + ?Sized>(
        &mut self,
        extractor: &E,
        url: &str,
    ) -> Result<(), ApiError> {
        match extractor.extract(url).await {
            Ok(listing) => {
                info!(url = url.trim(), "extracted tool data");
                self.apply_extraction(listing);
                Ok(())
            }
            Err(err) => {
                warn!(url = url.trim(), error = %err, "extraction failed");
                Err(err)
            }
        }
    }

    pub fn text(&self, field: TextField) -> &str {
        let d = &self.draft;
        match field {
            TextField::Title => &d.title,
            TextField::Description => &d.description,
            TextField::Website => &d.website,
            TextField::Image => &d.image,
            TextField::Thumbnail => &d.thumbnail,
            TextField::Creator => &d.creator,
            TextField::CreatorWebsite => &d.creator_website,
            TextField::Version => &d.version,
            TextField::ApiDocumentation => &d.api_documentation,
        }
    }

    pub fn set_text(&mut self, field: TextField, value: impl Into<String>) {
        let d = &mut self.draft;
        let slot = match field {
            TextField::Title => &mut d.title,
            TextField::Description => &mut d.description,
            TextField::Website => &mut d.website,
            TextField::Image => &mut d.image,
            TextField::Thumbnail => &mut d.thumbnail,
            TextField::Creator => &mut d.creator,
            TextField::CreatorWebsite => &mut d.creator_website,
            TextField::Version => &mut d.version,
            TextField::ApiDocumentation => &mut d.api_documentation,
        };
        *slot = value.into();
    }

    pub fn set_pricing_type(&mut self, pricing_type: PricingType) {
        self.draft.pricing_type = pricing_type;
    }

    pub fn set_starting_price(&mut self, price: f64) {
        self.draft.pricing_details.starting_price = price;
    }

    pub fn set_has_free_trial(&mut self, has_free_trial: bool) {
        self.draft.pricing_details.has_free_trial = has_free_trial;
    }

    pub fn set_trial_days(&mut self, days: u32) {
        self.draft.pricing_details.trial_days = days;
    }

    pub fn set_api_available(&mut self, available: bool) {
        self.draft.api_available = available;
    }

    pub fn shows_pricing_details(&self) -> bool {
        !self.draft.pricing_type.is_free()
    }

    pub fn shows_trial_days(&self) -> bool {
        self.shows_pricing_details() && self.draft.pricing_details.has_free_trial
    }

    pub fn shows_api_documentation(&self) -> bool {
        self.draft.api_available
    }

    pub fn entries(&self, list: TagList) -> &[String] {
        match list {
            TagList::Categories => &self.draft.categories,
            TagList::Tags => &self.draft.tags,
            TagList::Platforms => &self.draft.compatible_platforms,
            TagList::Integrations => &self.draft.integrations,
        }
    }

    fn entries_mut(&mut self, list: TagList) -> &mut Vec<String> {
        match list {
            TagList::Categories => &mut self.draft.categories,
            TagList::Tags => &mut self.draft.tags,
            TagList::Platforms => &mut self.draft.compatible_platforms,
            TagList::Integrations => &mut self.draft.integrations,
        }
    }

    pub fn set_pending(&mut self, list: TagList, value: impl Into<String>) {
        *self.pending.slot(list) = value.into();
    }

    /// Append the trimmed candidate unless it is blank or already listed
    /// (case-sensitive). On append the pending input for `list` is cleared.
    pub fn add_entry(&mut self, list: TagList, candidate: &str) -> bool {
        let candidate = candidate.trim();
        if candidate.is_empty() || self.entries(list).iter().any(|e| e == candidate) {
            return false;
        }
        self.entries_mut(list).push(candidate.to_string());
        self.pending.slot(list).clear();
        true
    }

    /// Commit whatever is typed into the pending input for `list`.
    pub fn add_pending(&mut self, list: TagList) -> bool {
        let candidate = self.pending.get(list).to_string();
        self.add_entry(list, &candidate)
    }

    /// Out-of-range indexes are ignored.
    pub fn remove_entry(&mut self, list: TagList, index: usize) -> Option<String> {
        let entries = self.entries_mut(list);
        (index < entries.len()).then(|| entries.remove(index))
    }

    /// Remove the trimmed `value` when present, append it otherwise. Returns
    /// whether the value is listed afterwards; a blank value changes nothing.
    pub fn toggle_entry(&mut self, list: TagList, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        let entries = self.entries_mut(list);
        if let Some(pos) = entries.iter().position(|e| e.trim() == value) {
            entries.remove(pos);
            false
        } else {
            entries.push(value.to_string());
            true
        }
    }

    pub fn add_feature(&mut self) {
        self.draft.features.push(Feature::default());
    }

    pub fn remove_feature(&mut self, index: usize) -> Option<Feature> {
        remove_at(&mut self.draft.features, index)
    }

    pub fn set_feature(&mut self, index: usize, field: FeatureField, value: impl Into<String>) -> bool {
        let Some(feature) = self.draft.features.get_mut(index) else {
            return false;
        };
        match field {
            FeatureField::Name => feature.name = value.into(),
            FeatureField::Description => feature.description = value.into(),
        }
        true
    }

    pub fn add_use_case(&mut self) {
        self.draft.use_cases.push(String::new());
    }

    pub fn remove_use_case(&mut self, index: usize) -> Option<String> {
        remove_at(&mut self.draft.use_cases, index)
    }

    pub fn set_use_case(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.draft.use_cases.get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Start a company profile if none is attached yet.
    pub fn attach_company(&mut self) -> &mut CompanyProfile {
        self.company.get_or_insert_with(CompanyProfile::default)
    }

    pub fn detach_company(&mut self) -> Option<CompanyProfile> {
        self.company.take()
    }

    /// Returns false when no company profile is attached.
    pub fn set_company_field(&mut self, field: CompanyField, value: impl Into<String>) -> bool {
        let Some(c) = self.company.as_mut() else {
            return false;
        };
        let slot = match field {
            CompanyField::Name => &mut c.name,
            CompanyField::Location => &mut c.location,
            CompanyField::Revenue => &mut c.revenue,
            CompanyField::Valuation => &mut c.valuation,
            CompanyField::Funding => &mut c.funding,
            CompanyField::Linkedin => &mut c.linkedin,
            CompanyField::Twitter => &mut c.twitter,
            CompanyField::FounderName => &mut c.founder.name,
            CompanyField::FounderTitle => &mut c.founder.title,
            CompanyField::FounderLinkedin => &mut c.founder.linkedin,
            CompanyField::FounderTwitter => &mut c.founder.twitter,
        };
        *slot = value.into();
        true
    }

    pub fn add_news(&mut self) -> bool {
        match self.company.as_mut() {
            Some(company) => {
                company.news.push(NewsItem::default());
                true
            }
            None => false,
        }
    }

    pub fn remove_news(&mut self, index: usize) -> Option<NewsItem> {
        remove_at(&mut self.company.as_mut()?.news, index)
    }

    pub fn set_news(&mut self, index: usize, field: NewsField, value: impl Into<String>) -> bool {
        let Some(item) = self
            .company
            .as_mut()
            .and_then(|c| c.news.get_mut(index))
        else {
            return false;
        };
        match field {
            NewsField::Title => item.title = value.into(),
            NewsField::Date => item.date = value.into(),
            NewsField::Url => item.url = value.into(),
        }
        true
    }

    /// The cleaned request this form would send. The live draft is untouched.
    pub fn submission(&self) -> Submission {
        Submission {
            id: self.record_id().map(str::to_string),
            payload: SubmissionPayload {
                tool: self.draft.cleaned(),
                company: self.company.as_ref().map(cleaned_company),
            },
        }
    }

    /// Validate the cleaned draft without submitting it. Company errors are
    /// keyed by the live news rows.
    pub fn check(&self) -> Result<(), FieldErrors> {
        validate(&self.draft.cleaned(), self.company.as_ref())
    }

    /// Validate, then send exactly one request. Validation failures never
    /// reach the submitter. On any failure the draft is left as the user
    /// typed it; remote failures are attached to [`SUBMIT_ERROR_FIELD`].
    ///
    /// `&mut self` already rules out overlapping calls from safe code; the
    /// [`SubmitError::Busy`] check guards the flag itself.
    pub async fn submit<S: Submitter + ?Sized>(&mut self, submitter: &S) -> Result<(), SubmitError> {
        if self.submitting {
            return Err(SubmitError::Busy);
        }

        let submission = self.submission();
        if let Err(errors) = validate(&submission.payload.tool, self.company.as_ref()) {
            debug!(count = errors.len(), "draft failed validation");
            self.errors = errors.clone();
            return Err(SubmitError::Invalid(errors));
        }
        self.errors.clear();

        let _in_flight = InFlight::start(&mut self.submitting);
        info!(
            id = submission.id.as_deref().unwrap_or("<new>"),
            title = %submission.payload.tool.title,
            "submitting tool"
        );
        match submitter.submit(&submission).await {
            Ok(()) => {
                info!("tool saved");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "tool submission failed");
                self.errors.insert(SUBMIT_ERROR_FIELD, err.to_string());
                Err(SubmitError::Remote(err))
            }
        }
    }
}

fn remove_at<T>(items: &mut Vec<T>, index: usize) -> Option<T> {
    (index < items.len()).then(|| items.remove(index))
}
