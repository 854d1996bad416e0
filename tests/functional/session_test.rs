//! Functional tests for the session store driving a scripted styling service

mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use support::{isolated, settings, upload_with_payload, ClassifyBehavior, MockService, RESULT_PAYLOAD};
use wardrobe_studio::image::{EncodedImage, RawUpload};
use wardrobe_studio::model::{Category, GarmentRecord, UNKNOWN_DESCRIPTION};
use wardrobe_studio::service::LayerHint;
use wardrobe_studio::studio::{CompositionPolicy, GenerationMode};
use wardrobe_studio::wardrobe::UploadPolicy;
use wardrobe_studio::{AppError, Session, SessionEvent};

fn session_with(upload: UploadPolicy, studio: CompositionPolicy) -> (Session, Arc<MockService>) {
    let service = Arc::new(MockService::new());
    let session = Session::new(settings(upload, studio), service.clone());
    (session, service)
}

fn session() -> (Session, Arc<MockService>) {
    session_with(UploadPolicy::Sequential, CompositionPolicy::Ordered)
}

fn garment(payload: &str, category: Category) -> GarmentRecord {
    GarmentRecord::captured(&EncodedImage::new(payload, "image/png"), category, None)
}

async fn upload_then_confirm_in_order(policy: UploadPolicy) {
    let (session, service) = session_with(policy, CompositionPolicy::Ordered);
    service.fail_isolation_for("QUFB");

    let queued = session
        .upload_garments(vec![
            upload_with_payload("shirt.png", "QUFB"),
            upload_with_payload("jeans.png", "QkJC"),
        ])
        .await
        .unwrap();

    assert_eq!(queued, 2);
    assert_eq!(session.pending_count(), 2);
    assert!(session.notice().is_none());

    // Failed isolation keeps the original image
    let head = session.pending_decision().unwrap();
    assert_eq!(head.image.payload(), "QUFB");
    assert!(!head.isolated);

    session.confirm_pending(Category::Top).unwrap();
    let head = session.pending_decision().unwrap();
    assert_eq!(head.image.payload(), isolated("QkJC"));
    assert!(head.isolated);
    session.confirm_pending(Category::Bottom).unwrap();

    assert_eq!(session.pending_count(), 0);
    let garments = session.garments();
    assert_eq!(garments.len(), 2);
    assert_eq!(garments[0].category, Category::Top);
    assert_eq!(garments[0].encoded_image().payload(), "QUFB");
    assert_eq!(garments[1].category, Category::Bottom);
    assert_eq!(garments[1].encoded_image().payload(), isolated("QkJC"));
    assert_eq!(garments[1].description.as_deref(), Some("White cotton tee"));

    assert_eq!(service.isolate_calls.load(Ordering::SeqCst), 2);
    assert_eq!(service.classify_calls.load(Ordering::SeqCst), 2);
    assert!(!session.processing_state().is_loading);
}

#[tokio::test]
async fn test_sequential_upload_then_confirm() {
    upload_then_confirm_in_order(UploadPolicy::Sequential).await;
}

#[tokio::test]
async fn test_fan_out_upload_keeps_submission_order() {
    upload_then_confirm_in_order(UploadPolicy::FanOut).await;
}

#[tokio::test]
async fn test_malformed_classification_falls_back() {
    let (session, service) = session();
    service.classify_with(ClassifyBehavior::Malformed);

    session
        .upload_garments(vec![upload_with_payload("mystery.png", "QUFB")])
        .await
        .unwrap();

    let suggestion = session.pending_decision().unwrap().suggestion.unwrap();
    assert_eq!(suggestion.category, Category::Accessory);
    assert_eq!(suggestion.description, UNKNOWN_DESCRIPTION);

    let id = session.accept_suggestion().unwrap().unwrap();
    assert_eq!(session.garment(&id).unwrap().category, Category::Accessory);
}

#[tokio::test]
async fn test_unreadable_upload_reported_and_rest_queued() {
    let (session, _service) = session();

    let queued = session
        .upload_garments(vec![
            RawUpload::from_path("/nonexistent/dir/missing.png"),
            upload_with_payload("tee.png", "QUFB"),
        ])
        .await
        .unwrap();

    assert_eq!(queued, 1);
    let notice = session.notice().unwrap();
    assert!(notice.starts_with("Failed to process some items"));
    assert!(notice.contains("missing.png"));
    assert!(!session.processing_state().is_loading);
}

#[tokio::test]
async fn test_configuration_error_aborts_upload() {
    let (session, service) = session();
    service.unconfigure_isolation();

    let result = session
        .upload_garments(vec![upload_with_payload("tee.png", "QUFB")])
        .await;

    assert!(matches!(result, Err(AppError::Configuration(_))));
    assert_eq!(session.pending_count(), 0);
    assert!(session.notice().is_some());
    assert!(!session.processing_state().is_loading);
}

#[tokio::test]
async fn test_unconfigured_classifier_is_not_swallowed() {
    let (session, service) = session();
    service.classify_with(ClassifyBehavior::Unconfigured);

    let result = session
        .upload_garments(vec![upload_with_payload("tee.png", "QUFB")])
        .await;

    assert!(matches!(result, Err(AppError::Configuration(_))));
    assert_eq!(session.pending_count(), 0);
}

#[tokio::test]
async fn test_discard_never_adds_garment() {
    let (session, _service) = session();
    session
        .upload_garments(vec![
            upload_with_payload("a.png", "QUFB"),
            upload_with_payload("b.png", "QkJC"),
        ])
        .await
        .unwrap();

    assert!(session.discard_pending());
    assert_eq!(session.pending_count(), 1);
    assert!(session.garments().is_empty());
    assert_eq!(
        session.pending_decision().unwrap().image.payload(),
        isolated("QkJC")
    );
}

#[tokio::test]
async fn test_confirm_on_empty_queue_is_noop() {
    let (session, _service) = session();
    assert_eq!(session.confirm_pending(Category::Top).unwrap(), None);
    assert_eq!(session.accept_suggestion().unwrap(), None);
    assert!(!session.discard_pending());
    assert!(session.garments().is_empty());
}

#[tokio::test]
async fn test_commit_selection_uses_store_order() {
    let (session, _service) = session();
    let top = session.add_garment(garment("QUFB", Category::Top)).unwrap();
    let bottom = session.add_garment(garment("QkJC", Category::Bottom)).unwrap();
    let shoes = session.add_garment(garment("Q0ND", Category::Shoes)).unwrap();

    assert!(session.toggle_selection_mode());
    // Click order differs from store order
    session.toggle_selected(&shoes);
    session.toggle_selected(&top);
    session.toggle_selected(&bottom);

    assert_eq!(session.commit_selection(), 3);
    assert!(!session.selection_active());

    let ids: Vec<_> = session.studio_items().into_iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![top, bottom, shoes]);
}

#[tokio::test]
async fn test_commit_empty_selection_changes_nothing() {
    let (session, _service) = session();
    let top = session.add_garment(garment("QUFB", Category::Top)).unwrap();
    session.add_to_studio(&top);

    session.toggle_selection_mode();
    assert_eq!(session.commit_selection(), 0);

    assert!(session.selection_active());
    assert_eq!(session.studio_items().len(), 1);
}

#[tokio::test]
async fn test_removed_garment_stays_in_studio() {
    let (session, _service) = session();
    let top = session.add_garment(garment("QUFB", Category::Top)).unwrap();
    session.add_to_studio(&top);

    assert!(session.remove_garment(&top).is_some());
    assert!(session.garments().is_empty());
    assert_eq!(session.studio_items()[0].id, top);
    assert_eq!(session.toggle_in_studio(&top), None);
}

#[tokio::test]
async fn test_slot_policy_replaces_same_category() {
    let (session, _service) = session_with(UploadPolicy::Sequential, CompositionPolicy::Slot);
    let first = session.add_garment(garment("QUFB", Category::Top)).unwrap();
    let second = session.add_garment(garment("QkJC", Category::Top)).unwrap();

    session.add_to_studio(&first);
    session.add_to_studio(&second);

    let studio = session.studio_items();
    assert_eq!(studio.len(), 1);
    assert_eq!(studio[0].id, second);
}

#[tokio::test]
async fn test_generate_with_empty_studio() {
    let (session, service) = session();

    let result = session.generate(GenerationMode::Avatar).await;

    assert!(matches!(result, Err(AppError::EmptySelection)));
    assert_eq!(service.compose_count(), 0);
    assert_eq!(
        session.notice().as_deref(),
        Some("Please select or upload items first.")
    );
    assert!(!session.processing_state().is_loading);
}

#[tokio::test]
async fn test_generate_sends_layers_in_order() {
    let (session, service) = session();
    let top = session.add_garment(garment("QUFB", Category::Top)).unwrap();
    let coat = session.add_garment(garment("QkJC", Category::Outerwear)).unwrap();
    session.add_to_studio(&top);
    session.add_to_studio(&coat);

    let image = session.generate(GenerationMode::FlatLay).await.unwrap();
    assert_eq!(image.payload(), RESULT_PAYLOAD);
    assert_eq!(session.generated_image().unwrap().payload(), RESULT_PAYLOAD);

    let request = service.last_compose().unwrap();
    assert_eq!(request.mode, GenerationMode::FlatLay);
    assert_eq!(request.layers.len(), 2);
    assert_eq!(request.layers[0].image.payload(), "QUFB");
    assert_eq!(request.layers[0].hint, LayerHint::Base);
    assert_eq!(request.layers[1].hint, LayerHint::Outer);
    assert!(request.identity_reference.is_none());
}

#[tokio::test]
async fn test_avatar_mode_sends_profile_face() {
    let (session, service) = session();
    let avatar = session
        .create_profile_avatar(upload_with_payload("selfie.png", "QUFB"))
        .await
        .unwrap();
    assert_eq!(service.avatar_calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.profile().avatar_image, Some(avatar.clone()));

    let top = session.add_garment(garment("QkJC", Category::Top)).unwrap();
    session.add_to_studio(&top);

    session.generate(GenerationMode::Avatar).await.unwrap();
    assert_eq!(service.last_compose().unwrap().identity_reference, Some(avatar));

    session.generate(GenerationMode::FlatLay).await.unwrap();
    assert!(service.last_compose().unwrap().identity_reference.is_none());
}

#[tokio::test]
async fn test_failed_generation_keeps_previous_image() {
    let (session, service) = session();
    let top = session.add_garment(garment("QUFB", Category::Top)).unwrap();
    session.add_to_studio(&top);
    session.generate(GenerationMode::Avatar).await.unwrap();

    service.fail_compose(Some("Quota exceeded"));
    let result = session.generate(GenerationMode::Avatar).await;

    assert!(matches!(result, Err(AppError::GenerationService(_))));
    assert_eq!(session.generated_image().unwrap().payload(), RESULT_PAYLOAD);
    assert_eq!(session.notice().as_deref(), Some("Quota exceeded"));
    assert_eq!(session.generation_output().error.as_deref(), Some("Quota exceeded"));
    assert!(!session.processing_state().is_loading);

    session.dismiss_notice();
    assert!(session.notice().is_none());
    assert!(session.generation_output().error.is_none());
}

#[tokio::test]
async fn test_concurrent_generate_is_rejected() {
    let (session, service) = session();
    service.delay_compose(Duration::from_millis(50));
    let top = session.add_garment(garment("QUFB", Category::Top)).unwrap();
    session.add_to_studio(&top);

    let (first, second) = tokio::join!(
        session.generate(GenerationMode::Avatar),
        session.generate(GenerationMode::FlatLay)
    );

    assert!(first.is_ok());
    assert!(matches!(second, Err(AppError::Busy(_))));
    assert_eq!(service.compose_count(), 1);
    assert!(!session.processing_state().is_loading);
}

#[tokio::test]
async fn test_upload_to_studio_skips_wardrobe() {
    let (session, service) = session();

    let added = session
        .upload_to_studio(vec![upload_with_payload("look.png", "QUFB")])
        .await
        .unwrap();

    assert_eq!(added, 1);
    assert!(session.garments().is_empty());
    let studio = session.studio_items();
    assert_eq!(studio[0].category, Category::Top);
    assert_eq!(studio[0].description.as_deref(), Some("Uploaded for styling"));
    assert_eq!(service.classify_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_save_generated_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let service = Arc::new(MockService::new());
    let mut settings = settings(UploadPolicy::Sequential, CompositionPolicy::Ordered);
    settings.output.dir = dir.path().to_string_lossy().to_string();
    let session = Session::new(settings, service);

    assert_eq!(session.save_generated().await.unwrap(), None);

    let top = session.add_garment(garment("QUFB", Category::Top)).unwrap();
    session.add_to_studio(&top);
    session.generate(GenerationMode::Avatar).await.unwrap();

    let path = session.save_generated().await.unwrap().unwrap();
    assert!(path.starts_with(dir.path()));
    assert_eq!(std::fs::read(&path).unwrap(), b"RESULT");
}

#[tokio::test]
async fn test_events_are_published() {
    let (session, _service) = session();
    let mut events = session.subscribe();

    session
        .upload_garments(vec![upload_with_payload("tee.png", "QUFB")])
        .await
        .unwrap();
    let id = session.confirm_pending(Category::Top).unwrap().unwrap();

    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::UploadsQueued { count: 1 }
    );
    assert_eq!(events.try_recv().unwrap(), SessionEvent::GarmentAdded(id));
}

#[tokio::test]
async fn test_duplicate_garment_rejected() {
    let (session, _service) = session();
    let record = garment("QUFB", Category::Top);
    session.add_garment(record.clone()).unwrap();

    assert!(matches!(
        session.add_garment(record),
        Err(AppError::DuplicateGarment(_))
    ));
    assert_eq!(session.garments().len(), 1);
}

#[tokio::test]
async fn test_same_file_names_stay_distinct() {
    let dir = tempfile::tempdir().unwrap();
    let summer = dir.path().join("summer");
    let winter = dir.path().join("winter");
    std::fs::create_dir_all(&summer).unwrap();
    std::fs::create_dir_all(&winter).unwrap();
    std::fs::write(summer.join("top.png"), b"linen").unwrap();
    std::fs::write(winter.join("top.png"), b"wool").unwrap();

    let (session, _service) = session();
    let paths = [summer.join("top.png"), winter.join("top.png")];
    let uploads = paths
        .iter()
        .map(|p| RawUpload::from_path(p).with_name(p.display().to_string()))
        .collect();
    session.upload_garments(uploads).await.unwrap();

    let first = session.pending_decision().unwrap();
    assert_eq!(first.source_name, Some(paths[0].display().to_string()));
    session.confirm_pending(Category::Top).unwrap();

    let second = session.pending_decision().unwrap();
    assert_eq!(second.source_name, Some(paths[1].display().to_string()));
    assert_ne!(first.source_name, second.source_name);
}

#[tokio::test]
async fn test_processing_state_is_observable() {
    let (session, service) = session();
    service.delay_compose(Duration::from_millis(20));
    let top = session.add_garment(garment("QUFB", Category::Top)).unwrap();
    session.add_to_studio(&top);

    let mut progress = session.watch_processing();
    let (result, observed) = tokio::join!(session.generate(GenerationMode::Avatar), async {
        progress.changed().await.unwrap();
        progress.borrow_and_update().clone()
    });

    assert!(result.is_ok());
    assert!(observed.is_loading);
    assert_eq!(observed.status_message, "Designing your 3D Outfit...");
    assert!(!progress.borrow().is_loading);
}
