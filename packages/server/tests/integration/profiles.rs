use crate::common::{routes, TestApp};

fn pin_ids(body: &serde_json::Value) -> Vec<String> {
    body.as_array()
        .expect("listing should be a JSON array")
        .iter()
        .map(|pin| pin["id"].as_str().expect("pin should have an id").to_string())
        .collect()
}

mod public_profile {
    use super::*;

    #[tokio::test]
    async fn profile_is_visible_without_authentication() {
        let app = TestApp::spawn().await;
        let (_, user_id) = app.create_authenticated_user("Ada", "ada@example.com").await;

        let res = app.get(&routes::user(user_id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"].as_i64(), Some(user_id));
        assert_eq!(res.body["name"], "Ada");
    }

    #[tokio::test]
    async fn profile_does_not_expose_the_email_address() {
        let app = TestApp::spawn().await;
        let (_, user_id) = app.create_authenticated_user("Ada", "ada@example.com").await;

        let res = app.get(&routes::user(user_id)).await;

        assert_eq!(res.status, 200);
        let fields = res.body.as_object().expect("profile should be a JSON object");
        assert!(!fields.contains_key("email"));
    }

    #[tokio::test]
    async fn unknown_user_returns_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::user(999_999)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod created_pins {
    use super::*;

    #[tokio::test]
    async fn listing_contains_only_that_users_pins() {
        let app = TestApp::spawn().await;
        let (ada, ada_id) = app.create_authenticated_user("Ada", "ada@example.com").await;
        let (grace, _) = app
            .create_authenticated_user("Grace", "grace@example.com")
            .await;
        let first = app.create_pin(&ada).await;
        let second = app.create_pin(&ada).await;
        app.create_pin(&grace).await;

        let res = app.get(&routes::user_pins(ada_id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(
            pin_ids(&res.body),
            vec![
                second["id"].as_str().unwrap().to_string(),
                first["id"].as_str().unwrap().to_string(),
            ],
            "newest pin should come first"
        );
    }

    #[tokio::test]
    async fn listing_for_a_user_with_no_pins_is_empty() {
        let app = TestApp::spawn().await;
        let (_, user_id) = app.create_authenticated_user("Ada", "ada@example.com").await;

        let res = app.get(&routes::user_pins(user_id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn listing_for_an_unknown_user_is_empty_rather_than_missing() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::user_pins(999_999)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().map(Vec::len), Some(0));
    }
}

mod liked_and_saved_listings {
    use super::*;

    #[tokio::test]
    async fn liked_listing_orders_by_most_recent_like() {
        let app = TestApp::spawn().await;
        let (ada, _) = app.create_authenticated_user("Ada", "ada@example.com").await;
        let (grace, grace_id) = app
            .create_authenticated_user("Grace", "grace@example.com")
            .await;
        let oldest = app.create_pin(&ada).await;
        let middle = app.create_pin(&ada).await;
        let newest = app.create_pin(&ada).await;

        // Like order deliberately differs from creation order.
        for pin in [&oldest, &newest, &middle] {
            app.post_with_token(&routes::pin_like(pin["id"].as_str().unwrap()), &grace)
                .await;
        }

        let res = app.get(&routes::user_liked(grace_id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(
            pin_ids(&res.body),
            vec![
                middle["id"].as_str().unwrap().to_string(),
                newest["id"].as_str().unwrap().to_string(),
                oldest["id"].as_str().unwrap().to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn saved_listing_contains_only_saved_pins() {
        let app = TestApp::spawn().await;
        let (token, user_id) = app.create_authenticated_user("Ada", "ada@example.com").await;
        let saved = app.create_pin(&token).await;
        app.create_pin(&token).await;

        app.post_with_token(&routes::pin_save(saved["id"].as_str().unwrap()), &token)
            .await;

        let res = app.get(&routes::user_saved(user_id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(
            pin_ids(&res.body),
            vec![saved["id"].as_str().unwrap().to_string()]
        );
    }

    #[tokio::test]
    async fn unliked_pins_drop_out_of_the_liked_listing() {
        let app = TestApp::spawn().await;
        let (token, user_id) = app.create_authenticated_user("Ada", "ada@example.com").await;
        let pin = app.create_pin(&token).await;
        let id = pin["id"].as_str().unwrap();

        app.post_with_token(&routes::pin_like(id), &token).await;
        app.delete_with_token(&routes::pin_like(id), &token).await;

        let res = app.get(&routes::user_liked(user_id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().map(Vec::len), Some(0));
    }
}

mod viewer_scoping {
    use super::*;

    /// Status flags on profile listings describe the requesting viewer,
    /// never the profile's owner.
    #[tokio::test]
    async fn listing_flags_follow_the_requester_not_the_profile_owner() {
        let app = TestApp::spawn().await;
        let (ada, ada_id) = app.create_authenticated_user("Ada", "ada@example.com").await;
        let (grace, _) = app
            .create_authenticated_user("Grace", "grace@example.com")
            .await;
        let pin = app.create_pin(&ada).await;
        let id = pin["id"].as_str().unwrap();

        app.post_with_token(&routes::pin_like(id), &grace).await;

        let as_grace = app.get_with_token(&routes::user_pins(ada_id), &grace).await;
        assert_eq!(as_grace.body[0]["liked"], true);

        let as_ada = app.get_with_token(&routes::user_pins(ada_id), &ada).await;
        assert_eq!(as_ada.body[0]["liked"], false);
    }

    #[tokio::test]
    async fn anonymous_listings_carry_no_status_flags() {
        let app = TestApp::spawn().await;
        let (token, user_id) = app.create_authenticated_user("Ada", "ada@example.com").await;
        let pin = app.create_pin(&token).await;
        app.post_with_token(&routes::pin_like(pin["id"].as_str().unwrap()), &token)
            .await;

        let res = app.get(&routes::user_pins(user_id)).await;

        assert_eq!(res.status, 200);
        let fields = res.body[0].as_object().expect("pin should be a JSON object");
        assert!(!fields.contains_key("liked"));
        assert!(!fields.contains_key("saved"));
    }

    #[tokio::test]
    async fn own_liked_listing_marks_every_pin_liked() {
        let app = TestApp::spawn().await;
        let (ada, _) = app.create_authenticated_user("Ada", "ada@example.com").await;
        let (grace, grace_id) = app
            .create_authenticated_user("Grace", "grace@example.com")
            .await;
        let first = app.create_pin(&ada).await;
        let second = app.create_pin(&ada).await;

        for pin in [&first, &second] {
            app.post_with_token(&routes::pin_like(pin["id"].as_str().unwrap()), &grace)
                .await;
        }

        let res = app.get_with_token(&routes::user_liked(grace_id), &grace).await;

        assert_eq!(res.status, 200);
        let pins = res.body.as_array().unwrap();
        assert_eq!(pins.len(), 2);
        for pin in pins {
            assert_eq!(pin["liked"], true);
        }
    }
}
