//! Thumbnail upload API integration tests.
//!
//! Run with: `cargo test -p tubely-api --test thumbnail_upload_test`
#![cfg(unix)]

mod helpers;

use axum::http::StatusCode;
use helpers::fixtures::{fake_png, thumbnail_form};
use helpers::setup_test_app;
use tubely_api::error::ErrorResponse;
use tubely_core::models::VideoResponse;
use uuid::Uuid;

const TEN_MIB: usize = 10 << 20;

fn upload_path(video_id: Uuid) -> String {
    format!("/api/videos/{}/thumbnail", video_id)
}

#[tokio::test]
async fn test_upload_png_thumbnail_and_serve_it() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video_id = app.seed_video(owner);
    let data = fake_png(2048);

    let response = app
        .client()
        .post(&upload_path(video_id))
        .authorization_bearer(app.token_for(owner))
        .multipart(thumbnail_form(data.clone(), "image/png"))
        .await;

    response.assert_status_ok();
    let body: VideoResponse = response.json();
    let thumbnail_url = body.thumbnail_url.expect("thumbnail url");
    let file = thumbnail_url
        .strip_prefix(&format!("{}/", helpers::ASSETS_BASE_URL))
        .expect("thumbnail served from assets");
    assert!(file.ends_with(".png"));
    // 32 random bytes, base64 URL-safe without padding, plus extension.
    assert_eq!(file.len(), 43 + ".png".len());
    assert!(body.video_url.is_none());

    let stored = app.repo.snapshot(video_id).unwrap();
    assert_eq!(stored.thumbnail_url.as_deref(), Some(thumbnail_url.as_str()));
    assert_eq!(app.staging_entries(), 0);

    let served = app.client().get(&format!("/assets/{}", file)).await;
    served.assert_status_ok();
    assert_eq!(served.as_bytes().as_ref(), data.as_slice());
    assert_eq!(served.header("content-type"), "image/png");
}

#[tokio::test]
async fn test_jpeg_thumbnail_uses_jpg_extension() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video_id = app.seed_video(owner);

    let response = app
        .client()
        .post(&upload_path(video_id))
        .authorization_bearer(app.token_for(owner))
        .multipart(thumbnail_form(b"\xFF\xD8\xFF\xE0jpeg".to_vec(), "image/jpeg"))
        .await;

    response.assert_status_ok();
    let body: VideoResponse = response.json();
    assert!(body.thumbnail_url.unwrap().ends_with(".jpg"));
}

#[tokio::test]
async fn test_gif_thumbnail_is_415_before_staging_or_storing() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video_id = app.seed_video(owner);

    let response = app
        .client()
        .post(&upload_path(video_id))
        .authorization_bearer(app.token_for(owner))
        .multipart(thumbnail_form(b"GIF89a".to_vec(), "image/gif"))
        .await;

    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: ErrorResponse = response.json();
    assert_eq!(body.code, "UNSUPPORTED_MEDIA_TYPE");
    assert_eq!(app.staging_entries(), 0);
    assert_eq!(app.stored_assets(), 0);
    assert_eq!(app.repo.update_count(), 0);
}

#[tokio::test]
async fn test_thumbnail_of_exactly_ten_mib_is_accepted() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video_id = app.seed_video(owner);

    app.client()
        .post(&upload_path(video_id))
        .authorization_bearer(app.token_for(owner))
        .multipart(thumbnail_form(fake_png(TEN_MIB), "image/png"))
        .await
        .assert_status_ok();

    assert_eq!(app.stored_assets(), 1);
}

#[tokio::test]
async fn test_thumbnail_one_byte_over_ten_mib_is_413() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video_id = app.seed_video(owner);

    let response = app
        .client()
        .post(&upload_path(video_id))
        .authorization_bearer(app.token_for(owner))
        .multipart(thumbnail_form(fake_png(TEN_MIB + 1), "image/png"))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.staging_entries(), 0);
    assert_eq!(app.stored_assets(), 0);
    assert_eq!(app.repo.update_count(), 0);
}

#[tokio::test]
async fn test_body_past_route_limit_is_413() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video_id = app.seed_video(owner);

    let response = app
        .client()
        .post(&upload_path(video_id))
        .authorization_bearer(app.token_for(owner))
        .multipart(thumbnail_form(fake_png(TEN_MIB + 256 * 1024), "image/png"))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.staging_entries(), 0);
    assert_eq!(app.stored_assets(), 0);
}

#[tokio::test]
async fn test_thumbnail_by_other_user_is_403() {
    let app = setup_test_app().await;
    let video_id = app.seed_video(Uuid::new_v4());

    let response = app
        .client()
        .post(&upload_path(video_id))
        .authorization_bearer(app.token_for(Uuid::new_v4()))
        .multipart(thumbnail_form(fake_png(64), "image/png"))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(app.staging_entries(), 0);
    assert_eq!(app.stored_assets(), 0);
    assert!(app.repo.snapshot(video_id).unwrap().thumbnail_url.is_none());
}

#[tokio::test]
async fn test_unknown_asset_is_404() {
    let app = setup_test_app().await;
    app.client()
        .get("/assets/missing.png")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
