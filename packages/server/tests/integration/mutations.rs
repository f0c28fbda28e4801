use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::Value;
use uuid::Uuid;

use crate::common::{routes, TestApp};
use server::entity::pin;

/// Fetch a pin as the given viewer and return its body.
async fn fetch_pin(app: &TestApp, id: &str, token: &str) -> Value {
    let res = app.get_with_token(&routes::pin(id), token).await;
    assert_eq!(res.status, 200, "pin fetch failed: {}", res.text);
    res.body
}

/// Force a pin's like counter to the given value, bypassing the API.
async fn set_likes(app: &TestApp, id: &str, value: i32) {
    pin::Entity::update_many()
        .col_expr(pin::Column::Likes, Expr::value(value))
        .filter(pin::Column::Id.eq(Uuid::parse_str(id).unwrap()))
        .exec(&app.db)
        .await
        .expect("Failed to update like counter directly");
}

async fn set_saves(app: &TestApp, id: &str, value: i32) {
    pin::Entity::update_many()
        .col_expr(pin::Column::Saves, Expr::value(value))
        .filter(pin::Column::Id.eq(Uuid::parse_str(id).unwrap()))
        .exec(&app.db)
        .await
        .expect("Failed to update save counter directly");
}

mod liking {
    use super::*;

    #[tokio::test]
    async fn liking_a_pin_marks_it_and_bumps_the_counter() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;
        let id = app.create_pin(&token).await["id"].as_str().unwrap().to_string();

        let res = app.post_with_token(&routes::pin_like(&id), &token).await;
        assert_eq!(res.status, 204);

        let pin = fetch_pin(&app, &id, &token).await;
        assert_eq!(pin["liked"], true);
        assert_eq!(pin["likes"], 1);
    }

    #[tokio::test]
    async fn liking_twice_counts_once() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;
        let id = app.create_pin(&token).await["id"].as_str().unwrap().to_string();

        let first = app.post_with_token(&routes::pin_like(&id), &token).await;
        let second = app.post_with_token(&routes::pin_like(&id), &token).await;
        assert_eq!(first.status, 204);
        assert_eq!(second.status, 204);

        let pin = fetch_pin(&app, &id, &token).await;
        assert_eq!(pin["liked"], true);
        assert_eq!(pin["likes"], 1);
    }

    #[tokio::test]
    async fn unliking_returns_the_pin_to_its_original_state() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;
        let id = app.create_pin(&token).await["id"].as_str().unwrap().to_string();

        app.post_with_token(&routes::pin_like(&id), &token).await;
        let res = app.delete_with_token(&routes::pin_like(&id), &token).await;
        assert_eq!(res.status, 204);

        let pin = fetch_pin(&app, &id, &token).await;
        assert_eq!(pin["liked"], false);
        assert_eq!(pin["likes"], 0);
    }

    #[tokio::test]
    async fn unliking_a_pin_that_was_never_liked_is_a_no_op() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;
        let id = app.create_pin(&token).await["id"].as_str().unwrap().to_string();

        let res = app.delete_with_token(&routes::pin_like(&id), &token).await;
        assert_eq!(res.status, 204);

        let pin = fetch_pin(&app, &id, &token).await;
        assert_eq!(pin["liked"], false);
        assert_eq!(pin["likes"], 0);
    }

    #[tokio::test]
    async fn likes_from_different_users_accumulate() {
        let app = TestApp::spawn().await;
        let (ada, _) = app.create_authenticated_user("Ada", "ada@example.com").await;
        let (grace, _) = app
            .create_authenticated_user("Grace", "grace@example.com")
            .await;
        let id = app.create_pin(&ada).await["id"].as_str().unwrap().to_string();

        app.post_with_token(&routes::pin_like(&id), &ada).await;
        app.post_with_token(&routes::pin_like(&id), &grace).await;

        let pin = fetch_pin(&app, &id, &ada).await;
        assert_eq!(pin["likes"], 2);
    }

    #[tokio::test]
    async fn liking_does_not_touch_the_save_state() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;
        let id = app.create_pin(&token).await["id"].as_str().unwrap().to_string();

        app.post_with_token(&routes::pin_like(&id), &token).await;

        let pin = fetch_pin(&app, &id, &token).await;
        assert_eq!(pin["saved"], false);
        assert_eq!(pin["saves"], 0);
    }
}

mod saving {
    use super::*;

    #[tokio::test]
    async fn saving_a_pin_marks_it_and_bumps_the_counter() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;
        let id = app.create_pin(&token).await["id"].as_str().unwrap().to_string();

        let res = app.post_with_token(&routes::pin_save(&id), &token).await;
        assert_eq!(res.status, 204);

        let pin = fetch_pin(&app, &id, &token).await;
        assert_eq!(pin["saved"], true);
        assert_eq!(pin["saves"], 1);
    }

    #[tokio::test]
    async fn saving_twice_counts_once() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;
        let id = app.create_pin(&token).await["id"].as_str().unwrap().to_string();

        app.post_with_token(&routes::pin_save(&id), &token).await;
        app.post_with_token(&routes::pin_save(&id), &token).await;

        let pin = fetch_pin(&app, &id, &token).await;
        assert_eq!(pin["saves"], 1);
    }

    #[tokio::test]
    async fn unsaving_returns_the_pin_to_its_original_state() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;
        let id = app.create_pin(&token).await["id"].as_str().unwrap().to_string();

        app.post_with_token(&routes::pin_save(&id), &token).await;
        let res = app.delete_with_token(&routes::pin_save(&id), &token).await;
        assert_eq!(res.status, 204);

        let pin = fetch_pin(&app, &id, &token).await;
        assert_eq!(pin["saved"], false);
        assert_eq!(pin["saves"], 0);
    }

    #[tokio::test]
    async fn unsaving_a_pin_that_was_never_saved_is_a_no_op() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;
        let id = app.create_pin(&token).await["id"].as_str().unwrap().to_string();

        let res = app.delete_with_token(&routes::pin_save(&id), &token).await;
        assert_eq!(res.status, 204);

        let pin = fetch_pin(&app, &id, &token).await;
        assert_eq!(pin["saves"], 0);
    }
}

mod counter_floor {
    use super::*;

    #[tokio::test]
    async fn unliking_never_drives_the_counter_below_zero() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;
        let id = app.create_pin(&token).await["id"].as_str().unwrap().to_string();

        // A like whose counter bump was lost leaves the counter at zero
        // with the link row still present.
        app.post_with_token(&routes::pin_like(&id), &token).await;
        set_likes(&app, &id, 0).await;

        let res = app.delete_with_token(&routes::pin_like(&id), &token).await;
        assert_eq!(res.status, 204);

        let pin = fetch_pin(&app, &id, &token).await;
        assert_eq!(pin["liked"], false);
        assert_eq!(pin["likes"], 0);
    }

    #[tokio::test]
    async fn unsaving_never_drives_the_counter_below_zero() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;
        let id = app.create_pin(&token).await["id"].as_str().unwrap().to_string();

        app.post_with_token(&routes::pin_save(&id), &token).await;
        set_saves(&app, &id, 0).await;

        let res = app.delete_with_token(&routes::pin_save(&id), &token).await;
        assert_eq!(res.status, 204);

        let pin = fetch_pin(&app, &id, &token).await;
        assert_eq!(pin["saves"], 0);
    }
}

mod failure_modes {
    use super::*;

    #[tokio::test]
    async fn liking_an_unknown_pin_returns_not_found() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;

        let res = app
            .post_with_token(&routes::pin_like(&Uuid::now_v7().to_string()), &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn saving_an_unknown_pin_returns_not_found() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;

        let res = app
            .post_with_token(&routes::pin_save(&Uuid::now_v7().to_string()), &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn mutations_require_authentication() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("Ada", "ada@example.com").await;
        let id = app.create_pin(&token).await["id"].as_str().unwrap().to_string();

        let res = app
            .post_json(&routes::pin_like(&id), &serde_json::json!({}))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }
}
