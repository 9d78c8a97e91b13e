//! An upload wizard bound to one claim: slots, step state and the HTTP side
//! effects of hydration and submission.

use serde::Serialize;
use std::future::Future;
use std::time::Duration;

use crate::api::logs::{log_error, log_info, log_success};
use crate::api::types::{UploadReceipt, UploadsData};
use crate::error::{ApiError, ApiResult, SubmitError, WizardResult};
use crate::lifecycle::{Cancelled, Lifecycle, LifecycleToken};
use crate::models::Role;

use super::hydrate::{map_uploads_to_state, HydrationReport};
use super::layout::{SlotId, UploadLayout};
use super::slot::UploadSlot;
use super::submit::UploadBatch;
use super::wizard::{
    CustomerStep, Phase, PersonalInfo, StepContext, SuccessCountdown, Transition, Wizard, WizardOptions,
    WizardStep, WorkshopStep,
};

/// Uploads endpoints the session talks to.
pub trait UploadApi {
    fn fetch_uploads(&self, role: Role, reference_id: &str) -> impl Future<Output = ApiResult<UploadsData>> + Send;

    fn post_documents(
        &self,
        role: Role,
        reference_id: &str,
        batch: &UploadBatch,
    ) -> impl Future<Output = ApiResult<UploadReceipt>> + Send;

    fn post_media(
        &self,
        role: Role,
        reference_id: &str,
        batch: &UploadBatch,
    ) -> impl Future<Output = ApiResult<UploadReceipt>> + Send;
}

/// Receipts of a successful submission. `None` means the batch was empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    pub documents: Option<UploadReceipt>,
    pub media: Option<UploadReceipt>,
    #[serde(skip)]
    pub countdown: SuccessCountdown,
}

pub type WorkshopSession = UploadSession<WorkshopStep>;
pub type CustomerSession = UploadSession<CustomerStep>;

#[derive(Debug)]
pub struct UploadSession<S: WizardStep> {
    reference_id: String,
    wizard: Wizard<S>,
    layout: UploadLayout,
    personal: PersonalInfo,
    lifecycle: Lifecycle,
}

impl<S: WizardStep> UploadSession<S> {
    pub fn new(reference_id: impl Into<String>, options: WizardOptions) -> Self {
        Self::with_wizard(reference_id, Wizard::new(options))
    }

    /// Resume on the step named in `url`.
    pub fn from_url(reference_id: impl Into<String>, url: &str, options: WizardOptions) -> Self {
        Self::with_wizard(reference_id, Wizard::from_url(url, options))
    }

    fn with_wizard(reference_id: impl Into<String>, wizard: Wizard<S>) -> Self {
        Self {
            reference_id: reference_id.into(),
            wizard,
            layout: UploadLayout::new(),
            personal: PersonalInfo::default(),
            lifecycle: Lifecycle::new(),
        }
    }

    pub fn role(&self) -> Role {
        S::ROLE
    }

    pub fn reference_id(&self) -> &str {
        &self.reference_id
    }

    pub fn wizard(&self) -> &Wizard<S> {
        &self.wizard
    }

    pub fn layout(&self) -> &UploadLayout {
        &self.layout
    }

    pub fn slot_mut(&mut self, id: SlotId) -> Option<&mut UploadSlot> {
        self.layout.slot_mut(id)
    }

    pub fn personal(&self) -> &PersonalInfo {
        &self.personal
    }

    pub fn personal_mut(&mut self) -> &mut PersonalInfo {
        &mut self.personal
    }

    pub fn token(&self) -> LifecycleToken {
        self.lifecycle.token()
    }

    /// Cancel in-flight requests and timers.
    pub fn teardown(&self) {
        self.lifecycle.teardown();
    }

    // -------------------------------------------------------------------------
    // Step navigation
    // -------------------------------------------------------------------------

    pub fn next(&mut self) -> WizardResult<S> {
        let ctx = StepContext { layout: &self.layout, personal: &self.personal };
        self.wizard.next(&ctx)
    }

    pub fn previous(&mut self) -> WizardResult<Transition<S>> {
        self.wizard.previous()
    }

    pub fn edit_jump(&mut self, target: S) -> WizardResult<S> {
        self.wizard.edit_jump(target)
    }

    // -------------------------------------------------------------------------
    // Server side effects
    // -------------------------------------------------------------------------

    /// Fetch existing uploads and place them into the slots.
    pub async fn hydrate<C: UploadApi>(&mut self, api: &C) -> ApiResult<HydrationReport> {
        let token = self.lifecycle.token();
        let data = guarded(&token, api.fetch_uploads(S::ROLE, &self.reference_id))
            .await
            .inspect_err(|e| log_error(format!("Failed to load uploads for {}: {}", self.reference_id, e)))?;

        let report = map_uploads_to_state(&mut self.layout, &data);
        log_info(format!(
            "Loaded {} documents and {} media for {}",
            report.documents_placed, report.media_placed, self.reference_id
        ));
        Ok(report)
    }

    /// Submit from the review step: documents first, then media.
    ///
    /// Media is only posted once documents succeeded; nothing is rolled back.
    /// On any failure the wizard stays where it is and the slots are kept.
    pub async fn confirm<C: UploadApi>(&mut self, api: &C) -> Result<SubmitOutcome, SubmitError> {
        let ctx = StepContext { layout: &self.layout, personal: &self.personal };
        let plan = self.wizard.confirm(&ctx)?;
        let token = self.lifecycle.token();

        let documents = if plan.documents.is_empty() {
            None
        } else {
            let receipt = guarded(&token, api.post_documents(S::ROLE, &self.reference_id, &plan.documents))
                .await
                .inspect_err(|e| log_error(format!("Document upload failed: {}", e)))
                .map_err(SubmitError::Documents)?;
            Some(receipt)
        };

        let media = if plan.media.is_empty() {
            None
        } else {
            let receipt = guarded(&token, api.post_media(S::ROLE, &self.reference_id, &plan.media))
                .await
                .inspect_err(|e| log_error(format!("Media upload failed: {}", e)))
                .map_err(SubmitError::Media)?;
            Some(receipt)
        };

        self.layout.clear();
        let countdown = self.wizard.complete();
        log_success(format!(
            "Submitted {} documents and {} media for {}",
            plan.documents.len(),
            plan.media.len(),
            self.reference_id
        ));

        Ok(SubmitOutcome { documents, media, countdown })
    }

    /// Run the success modal countdown, then reset the session to step 1.
    ///
    /// Does nothing unless the wizard is completed.
    pub async fn run_success_countdown(
        &mut self,
        period: Duration,
        on_tick: impl FnMut(u32),
    ) -> Result<(), Cancelled> {
        let Phase::Completed(countdown) = self.wizard.phase() else {
            return Ok(());
        };
        countdown.run(&self.lifecycle.token(), period, on_tick).await?;
        self.reset();
        Ok(())
    }

    /// Empty every slot, forget personal details and return to step 1.
    pub fn reset(&mut self) {
        self.layout.clear();
        self.personal = PersonalInfo::default();
        self.wizard.restart();
    }
}

async fn guarded<T>(token: &LifecycleToken, request: impl Future<Output = ApiResult<T>>) -> ApiResult<T> {
    token.guard(request).await.map_err(ApiError::from)?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{DocumentUpload, MediaUpload};
    use crate::error::WizardError;
    use crate::upload::slot::LocalFile;
    use crate::upload::submit::UploadMeta;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeApi {
        uploads: UploadsData,
        fail_documents: bool,
        fail_media: bool,
        posted: Mutex<Vec<(&'static str, Vec<UploadMeta>)>>,
    }

    impl FakeApi {
        fn calls(&self) -> Vec<&'static str> {
            self.posted.lock().unwrap().iter().map(|(kind, _)| *kind).collect()
        }

        fn receipt(batch: &UploadBatch) -> UploadReceipt {
            UploadReceipt { uploaded: batch.len(), ids: (1..=batch.len() as u64).collect() }
        }
    }

    impl UploadApi for FakeApi {
        async fn fetch_uploads(&self, _role: Role, _reference_id: &str) -> ApiResult<UploadsData> {
            Ok(self.uploads.clone())
        }

        async fn post_documents(&self, _role: Role, _reference_id: &str, batch: &UploadBatch) -> ApiResult<UploadReceipt> {
            self.posted.lock().unwrap().push(("documents", batch.meta.clone()));
            if self.fail_documents {
                return Err(ApiError::Status { status: 500, body: "disk full".into() });
            }
            Ok(Self::receipt(batch))
        }

        async fn post_media(&self, _role: Role, _reference_id: &str, batch: &UploadBatch) -> ApiResult<UploadReceipt> {
            self.posted.lock().unwrap().push(("media", batch.meta.clone()));
            if self.fail_media {
                return Err(ApiError::Status { status: 502, body: "bad gateway".into() });
            }
            Ok(Self::receipt(batch))
        }
    }

    fn filled_session() -> WorkshopSession {
        let mut session = WorkshopSession::from_url("CLM-001", "http://app/?step=3", WizardOptions::default());
        session
            .slot_mut(SlotId::Document(1))
            .unwrap()
            .add(LocalFile::new("form.pdf", "application/pdf", vec![1]))
            .unwrap();
        session
            .slot_mut(SlotId::Media(2))
            .unwrap()
            .add(LocalFile::new("rear.jpg", "image/jpeg", vec![1]))
            .unwrap();
        session
    }

    #[tokio::test]
    async fn test_hydrate_places_uploads() {
        let api = FakeApi {
            uploads: UploadsData {
                documents: vec![DocumentUpload {
                    id: 1,
                    document_type_id: 3,
                    file_name: Some("rc.pdf".into()),
                    file_url: "http://files/1".into(),
                }],
                media: vec![MediaUpload {
                    id: 2,
                    section_id: 4,
                    file_name: None,
                    file_url: "http://files/2/right.jpg".into(),
                }],
            },
            ..FakeApi::default()
        };
        let mut session = CustomerSession::new("CLM-002", WizardOptions::default());

        let report = session.hydrate(&api).await.unwrap();
        assert_eq!((report.documents_placed, report.media_placed), (1, 1));
        assert_eq!(session.layout().documents[2].items()[0].name(), "rc.pdf");
        assert_eq!(session.layout().top[3].items()[0].name(), "right.jpg");
    }

    #[tokio::test]
    async fn test_hydrate_twice_does_not_duplicate() {
        let api = FakeApi {
            uploads: UploadsData {
                documents: vec![DocumentUpload {
                    id: 1,
                    document_type_id: 3,
                    file_name: Some("rc.pdf".into()),
                    file_url: "http://files/1".into(),
                }],
                media: vec![MediaUpload {
                    id: 2,
                    section_id: 1,
                    file_name: Some("front.jpg".into()),
                    file_url: "http://files/2".into(),
                }],
            },
            ..FakeApi::default()
        };
        let mut session = WorkshopSession::new("CLM-004", WizardOptions::default());

        session.hydrate(&api).await.unwrap();
        let report = session.hydrate(&api).await.unwrap();

        assert_eq!((report.documents_placed, report.media_placed), (1, 1));
        assert_eq!(session.layout().documents[2].items().len(), 1);
        assert_eq!(session.layout().top[0].items().len(), 1);
        assert_eq!(session.layout().item_count(), 2);
    }

    #[tokio::test]
    async fn test_hydrate_after_teardown_is_cancelled() {
        let api = FakeApi::default();
        let mut session = WorkshopSession::new("CLM-003", WizardOptions::default());
        session.teardown();

        let err = session.hydrate(&api).await.unwrap_err();
        assert!(matches!(err, ApiError::Cancelled));
    }

    #[tokio::test]
    async fn test_confirm_posts_documents_then_media() {
        let api = FakeApi::default();
        let mut session = filled_session();

        let outcome = session.confirm(&api).await.unwrap();
        assert_eq!(api.calls(), vec!["documents", "media"]);
        assert_eq!(outcome.documents.unwrap().uploaded, 1);
        assert_eq!(outcome.countdown.remaining(), 10);
        assert!(session.wizard().is_completed());
        assert_eq!(session.layout().item_count(), 0);
    }

    #[tokio::test]
    async fn test_document_failure_skips_media() {
        let api = FakeApi { fail_documents: true, ..FakeApi::default() };
        let mut session = filled_session();

        let err = session.confirm(&api).await.unwrap_err();
        assert!(matches!(err, SubmitError::Documents(_)));
        assert_eq!(api.calls(), vec!["documents"]);
        assert_eq!(session.wizard().current(), Some(WorkshopStep::Review));
        assert_eq!(session.layout().item_count(), 2);
    }

    #[tokio::test]
    async fn test_media_failure_keeps_state() {
        let api = FakeApi { fail_media: true, ..FakeApi::default() };
        let mut session = filled_session();

        let err = session.confirm(&api).await.unwrap_err();
        assert!(matches!(err, SubmitError::Media(ApiError::Status { status: 502, .. })));
        assert_eq!(api.calls(), vec!["documents", "media"]);
        assert_eq!(session.wizard().current(), Some(WorkshopStep::Review));
    }

    #[tokio::test]
    async fn test_confirm_requires_names_for_customer() {
        let api = FakeApi::default();
        let mut session = CustomerSession::from_url("CLM-004", "http://app/?step=4", WizardOptions::default());

        let err = session.confirm(&api).await.unwrap_err();
        assert!(matches!(err, SubmitError::Wizard(WizardError::MissingField { .. })));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_countdown_resets_session() {
        let api = FakeApi::default();
        let mut session = CustomerSession::from_url("CLM-005", "http://app/?step=4", WizardOptions::default());
        session.personal_mut().first_name = "Asha".into();
        session.personal_mut().last_name = "Rao".into();
        session.confirm(&api).await.unwrap();

        let mut ticks = 0;
        session
            .run_success_countdown(Duration::from_millis(1), |_| ticks += 1)
            .await
            .unwrap();

        assert_eq!(ticks, 9);
        assert_eq!(session.wizard().current(), Some(CustomerStep::Documents));
        assert!(session.personal().first_name.is_empty());
    }
}
