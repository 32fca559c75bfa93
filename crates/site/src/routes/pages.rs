//! Public pages: the animated home intro and the markdown portfolio pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::filters;
use crate::middleware::{CspNonce, OptionalAuth};
use crate::models::CurrentUser;
use crate::state::AppState;

use super::not_found;

/// Loading dots are shown until the name is revealed.
pub const INTRO_NAME_REVEAL_MS: u32 = 2000;

/// The name gives way to the landing buttons.
pub const INTRO_LANDING_MS: u32 = 4000;

/// The intro is over and the secondary navigation appears.
pub const INTRO_COMPLETE_MS: u32 = 5000;

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub current_user: Option<CurrentUser>,
    pub nonce: String,
    pub name_reveal_ms: u32,
    pub landing_ms: u32,
    pub complete_ms: u32,
}

#[derive(Template, WebTemplate)]
#[template(path = "page.html")]
pub struct ContentPageTemplate {
    pub current_user: Option<CurrentUser>,
    pub slug: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: String,
    pub content_html: String,
}

/// Home page with the timed intro sequence.
///
/// The sequence runs on CSS animation delays set from the constants above,
/// inside a nonce-tagged `<style>` block.
#[instrument(skip_all)]
pub async fn home(nonce: CspNonce, OptionalAuth(current_user): OptionalAuth) -> impl IntoResponse {
    HomeTemplate {
        current_user,
        nonce: nonce.value().to_string(),
        name_reveal_ms: INTRO_NAME_REVEAL_MS,
        landing_ms: INTRO_LANDING_MS,
        complete_ms: INTRO_COMPLETE_MS,
    }
}

/// Render a markdown page by slug, or 404.
fn serve_content_page(state: &AppState, slug: &str, current_user: Option<CurrentUser>) -> Response {
    let Some(page) = state.content().get_page(slug) else {
        tracing::warn!(slug, "Content page not found");
        return not_found(current_user);
    };

    ContentPageTemplate {
        current_user,
        slug: page.slug.clone(),
        title: page.meta.title.clone(),
        subtitle: page.meta.subtitle.clone(),
        description: page.meta.description.clone().unwrap_or_default(),
        content_html: page.content_html.clone(),
    }
    .into_response()
}

macro_rules! content_page {
    ($name:ident, $slug:literal) => {
        #[instrument(skip_all)]
        pub async fn $name(
            State(state): State<AppState>,
            OptionalAuth(current_user): OptionalAuth,
        ) -> Response {
            serve_content_page(&state, $slug, current_user)
        }
    };
}

content_page!(about, "about");
content_page!(contact, "contact");
content_page!(interests, "interests");
content_page!(sports, "sports");
content_page!(finance, "finance");
content_page!(projects, "projects");
content_page!(guest, "guest");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_intro_renders_timings_under_nonce() {
        let html = HomeTemplate {
            current_user: None,
            nonce: "abc123".to_string(),
            name_reveal_ms: INTRO_NAME_REVEAL_MS,
            landing_ms: INTRO_LANDING_MS,
            complete_ms: INTRO_COMPLETE_MS,
        }
        .render()
        .unwrap();

        assert!(html.contains(r#"<style nonce="abc123">"#));
        assert!(html.contains("2000ms"));
        assert!(html.contains("4000ms"));
        assert!(html.contains("5000ms"));
        assert!(html.contains("PAUL SCHLINDWEIN"));
        assert!(html.contains(r#"href="/register""#));
        assert!(html.contains(r#"href="/signin""#));
        assert!(html.contains(r#"href="/guest""#));
    }

    #[test]
    fn test_intro_stages_are_ordered() {
        assert!(INTRO_NAME_REVEAL_MS < INTRO_LANDING_MS);
        assert!(INTRO_LANDING_MS < INTRO_COMPLETE_MS);
    }
}
