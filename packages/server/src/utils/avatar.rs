use serde::Deserialize;
use tracing::warn;

/// Served when Unsplash is unavailable or no access key is configured.
pub const PLACEHOLDER_AVATAR: &str = "https://placehold.co/400x400/eeeeee/333333?text=USER";

const UNSPLASH_RANDOM_URL: &str =
    "https://api.unsplash.com/photos/random?query=profile&orientation=squarish";

#[derive(Deserialize)]
struct UnsplashPhoto {
    urls: UnsplashUrls,
}

#[derive(Deserialize)]
struct UnsplashUrls {
    small: String,
}

/// Fetch a random profile avatar URL from Unsplash.
///
/// Any failure falls back to the placeholder. Registration must never
/// depend on Unsplash being reachable.
pub async fn random_avatar_url(http: &reqwest::Client, access_key: Option<&str>) -> String {
    let Some(key) = access_key else {
        return PLACEHOLDER_AVATAR.to_string();
    };

    let result = async {
        let photo: UnsplashPhoto = http
            .get(UNSPLASH_RANDOM_URL)
            .header("Authorization", format!("Client-ID {key}"))
            .timeout(std::time::Duration::from_secs(5))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok::<_, reqwest::Error>(photo.urls.small)
    }
    .await;

    match result {
        Ok(url) => url,
        Err(e) => {
            warn!("Unsplash avatar fetch failed: {}", e);
            PLACEHOLDER_AVATAR.to_string()
        }
    }
}
