//! Drives the upload wizard against the in-memory backend over real HTTP.

use claimdesk::api::types::{ClaimDetails, PolicyInfo};
use claimdesk::server::{serve, AppState};
use claimdesk::{
    ApiError, ClaimsClient, ClientConfig, CustomerSession, LocalFile, Role, SlotId, SubmitError, UploadItem,
    WizardOptions, WorkshopSession, WorkshopStep,
};
use std::sync::Arc;
use tokio::net::TcpListener;

async fn start() -> (ClaimsClient, Arc<AppState>) {
    let state = Arc::new(AppState::new());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, state.clone()));

    let config = ClientConfig::default().with_api_url(format!("http://{}", addr));
    (ClaimsClient::new(&config).unwrap(), state)
}

fn pdf(name: &str) -> LocalFile {
    LocalFile::new(name, "application/pdf", b"%PDF-1.4".to_vec())
}

fn jpeg(name: &str) -> LocalFile {
    LocalFile::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF])
}

#[tokio::test]
async fn test_claim_access() {
    let (client, state) = start().await;
    let claim = ClaimDetails {
        reference_id: "CLM-2024-0042".into(),
        status: "survey_pending".into(),
        policy: Some(PolicyInfo {
            policy_number: "POL-77".into(),
            holder_name: Some("Asha Rao".into()),
            vehicle_number: None,
        }),
        insurer: None,
        workshop: None,
        allocation: None,
    };
    state.insert_claim("link-token", claim.clone()).await;

    assert_eq!(client.claim_access("link-token").await.unwrap(), claim);

    let err = client.claim_access("unknown").await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_submit_then_hydrate() {
    let (client, _state) = start().await;

    let mut session = WorkshopSession::new("CLM-100", WizardOptions::default());
    session.hydrate(&client).await.unwrap();
    session.slot_mut(SlotId::Document(3)).unwrap().add(pdf("rc.pdf")).unwrap();
    session.slot_mut(SlotId::Media(1)).unwrap().add(jpeg("front.jpg")).unwrap();
    session.slot_mut(SlotId::Media(11)).unwrap().add(jpeg("under.jpg")).unwrap();

    assert_eq!(session.next(), Ok(WorkshopStep::Photos));
    assert_eq!(session.next(), Ok(WorkshopStep::Review));

    let outcome = session.confirm(&client).await.unwrap();
    assert_eq!(outcome.documents.map(|r| r.uploaded), Some(1));
    assert_eq!(outcome.media.map(|r| r.uploaded), Some(2));
    assert!(session.wizard().is_completed());

    let mut reopened = WorkshopSession::new("CLM-100", WizardOptions::default());
    let report = reopened.hydrate(&client).await.unwrap();
    assert_eq!((report.documents_placed, report.media_placed), (1, 2));

    let layout = reopened.layout();
    assert!(matches!(&layout.documents[2].items()[0], UploadItem::Remote(f) if f.name == "rc.pdf"));
    assert!(layout.documents.iter().enumerate().all(|(i, s)| i == 2 || s.is_empty()));
    assert_eq!(layout.top[0].items()[0].name(), "front.jpg");
    assert_eq!(layout.right[2].items()[0].name(), "under.jpg");

    // Hydrated files are not sent again
    reopened.slot_mut(SlotId::Media(2)).unwrap().add(jpeg("rear.jpg")).unwrap();
    let outcome = {
        let mut s = reopened;
        while s.next().is_ok() {}
        s.confirm(&client).await.unwrap()
    };
    assert!(outcome.documents.is_none());
    assert_eq!(outcome.media.map(|r| r.uploaded), Some(1));
}

#[tokio::test]
async fn test_uploads_are_scoped_by_role() {
    let (client, _state) = start().await;

    let mut workshop = WorkshopSession::from_url("CLM-200", "http://app/?step=3", WizardOptions::default());
    workshop.slot_mut(SlotId::Document(1)).unwrap().add(pdf("form.pdf")).unwrap();
    workshop.confirm(&client).await.unwrap();

    let customer_view = client.uploads(Role::Customer, "CLM-200").await.unwrap();
    assert!(customer_view.documents.is_empty());

    let mut customer = CustomerSession::new("CLM-200", WizardOptions::default());
    let report = customer.hydrate(&client).await.unwrap();
    assert_eq!(report.documents_placed, 0);
}

#[tokio::test]
async fn test_unreachable_server_keeps_review_step() {
    let config = ClientConfig::default().with_api_url("http://127.0.0.1:9");
    let client = ClaimsClient::new(&config).unwrap();

    let mut session = WorkshopSession::from_url("CLM-300", "http://app/?step=3", WizardOptions::default());
    session.slot_mut(SlotId::Document(2)).unwrap().add(pdf("licence.pdf")).unwrap();

    let err = session.confirm(&client).await.unwrap_err();
    assert!(matches!(err, SubmitError::Documents(ApiError::Request(_))));
    assert_eq!(session.wizard().current(), Some(WorkshopStep::Review));
    assert_eq!(session.layout().item_count(), 1);
}

#[tokio::test]
async fn test_downloads_stored_file() {
    let (client, _state) = start().await;

    let mut session = WorkshopSession::from_url("CLM-400", "http://app/?step=3", WizardOptions::default());
    session.slot_mut(SlotId::Document(5)).unwrap().add(pdf("estimate.pdf")).unwrap();
    let outcome = session.confirm(&client).await.unwrap();
    let id = outcome.documents.unwrap().ids[0];

    let url = client.base_url().join(&format!("/files/{}", id)).unwrap();
    let response = reqwest::get(url).await.unwrap();
    assert_eq!(response.headers()["content-type"], "application/pdf");
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"%PDF-1.4");
}
