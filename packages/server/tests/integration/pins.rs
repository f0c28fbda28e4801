use serde_json::json;
use uuid::Uuid;

use crate::common::{routes, TestApp, TEST_MAX_IMAGE_SIZE};

mod pin_creation {
    use super::*;

    #[tokio::test]
    async fn authenticated_user_can_create_a_pin() {
        let app = TestApp::spawn().await;
        let (token, user_id) = app.create_authenticated_user("Ada", "ada@example.com").await;

        let pin = app
            .create_pin_with_caption(
                &token,
                "Golden Gate at Dusk",
                "The bridge fading into evening fog.",
                &["bridge", "fog"],
            )
            .await;

        assert_eq!(pin["title"], "Golden Gate at Dusk");
        assert_eq!(pin["description"], "The bridge fading into evening fog.");
        assert_eq!(pin["tags"], json!(["bridge", "fog"]));
        assert_eq!(pin["created_by"].as_i64(), Some(user_id));
        assert_eq!(pin["username"], "Ada");
        assert_eq!(pin["likes"], 0);
        assert_eq!(pin["saves"], 0);
        assert_eq!(pin["liked"], false);
        assert_eq!(pin["saved"], false);
        assert!(
            pin["id"].as_str().is_some_and(|id| id.parse::<Uuid>().is_ok()),
            "pin id should be a UUID: {}",
            pin["id"]
        );
    }

    #[tokio::test]
    async fn pin_image_url_points_at_the_media_endpoint() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;

        let pin = app.create_pin(&token).await;
        let image_url = pin["image_url"].as_str().expect("image_url should be a string");

        assert!(
            image_url.starts_with("/api/v1/media/"),
            "unexpected image_url: {image_url}"
        );
    }

    #[tokio::test]
    async fn caption_tags_are_normalized() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;

        let pin = app
            .create_pin_with_caption(
                &token,
                "Shoreline",
                "Waves on a beach.",
                &["  Sunset ", "OCEAN", "sunset", ""],
            )
            .await;

        assert_eq!(pin["tags"], json!(["sunset", "ocean"]));
    }

    #[tokio::test]
    async fn created_pin_is_retrievable_by_id() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;

        let pin = app
            .create_pin_with_caption(&token, "Lighthouse", "A lighthouse at dawn.", &["coast"])
            .await;
        let id = pin["id"].as_str().unwrap();

        let res = app.get(&routes::pin(id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "Lighthouse");
        assert_eq!(res.body["id"], pin["id"]);
    }

    #[tokio::test]
    async fn uploading_the_same_image_twice_reuses_the_stored_media() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;
        let image = app.unique_image();

        let first = app
            .upload_with_token(routes::PINS, "one.png", "image/png", image.clone(), &token)
            .await;
        let second = app
            .upload_with_token(routes::PINS, "two.png", "image/png", image, &token)
            .await;

        assert_eq!(first.status, 201);
        assert_eq!(second.status, 201);
        assert_ne!(first.body["id"], second.body["id"]);
        assert_eq!(first.body["image_url"], second.body["image_url"]);
    }
}

mod upload_validation {
    use super::*;

    #[tokio::test]
    async fn upload_without_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.post_json(routes::PINS, &json!({})).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn non_image_upload_is_rejected() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;

        let res = app
            .upload_with_token(
                routes::PINS,
                "notes.txt",
                "text/plain",
                b"just some text".to_vec(),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn upload_without_a_file_field_is_rejected() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;

        let part = reqwest::multipart::Part::bytes(app.unique_image())
            .file_name("photo.png")
            .mime_str("image/png")
            .unwrap();
        let form = reqwest::multipart::Form::new().part("picture", part);
        let res = app
            .client
            .post(format!("http://{}{}", app.addr, routes::PINS))
            .header("Authorization", format!("Bearer {token}"))
            .multipart(form)
            .send()
            .await
            .unwrap();

        assert_eq!(res.status().as_u16(), 400);
    }

    #[tokio::test]
    async fn empty_image_is_rejected() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;

        let res = app
            .upload_with_token(routes::PINS, "empty.png", "image/png", Vec::new(), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn oversized_image_is_rejected() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;

        let oversized = vec![0u8; TEST_MAX_IMAGE_SIZE as usize + 1];
        let res = app
            .upload_with_token(routes::PINS, "huge.png", "image/png", oversized, &token)
            .await;

        assert_eq!(res.status, 413);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
    }
}

mod captioning_failures {
    use super::*;

    #[tokio::test]
    async fn captioner_failure_returns_bad_gateway() {
        let app = TestApp::spawn_with_failing_captioner().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;

        let res = app
            .upload_with_token(
                routes::PINS,
                "photo.png",
                "image/png",
                app.unique_image(),
                &token,
            )
            .await;

        assert_eq!(res.status, 502);
        assert_eq!(res.body["code"], "CAPTIONING_FAILED");
    }

    #[tokio::test]
    async fn failed_captioning_does_not_create_a_pin() {
        let app = TestApp::spawn_with_failing_captioner().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;

        let res = app
            .upload_with_token(
                routes::PINS,
                "photo.png",
                "image/png",
                app.unique_image(),
                &token,
            )
            .await;
        assert_eq!(res.status, 502);

        let feed = app.get(routes::PINS).await;
        assert_eq!(feed.status, 200);
        assert_eq!(feed.body.as_array().map(Vec::len), Some(0));
    }
}

mod single_pin {
    use super::*;

    #[tokio::test]
    async fn unknown_pin_returns_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::pin(&Uuid::now_v7().to_string())).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn malformed_pin_id_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::pin("not-a-uuid")).await;

        assert_eq!(res.status, 400);
    }
}
