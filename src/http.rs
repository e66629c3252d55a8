use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::{
    admin::{AdminError, REPLACEMENT_FIELDS_ACTION, SAVE_TERMS_ACTION, SettingsCommands},
    auth::AccessDirectory,
    filter::{ContentFilter, render_content},
    pages::{self, Notice, WORD_FILTER_CSS},
    settings::SettingsStore,
    types::{Capability, Principal},
};

const OPTIONS_PAGE_PATH: &str = "/admin/word-filter/options";

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<dyn SettingsStore>,
    pub commands: SettingsCommands,
    pub directory: Arc<AccessDirectory>,
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct WordFilterForm {
    #[serde(rename = "word-filter-submit")]
    pub submit: Option<String>,
    #[serde(rename = "word-filter-nonce")]
    pub nonce: Option<String>,
    pub plugin_words_to_filter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReplacementForm {
    #[serde(rename = "replacement-fields-nonce")]
    pub nonce: Option<String>,
    #[serde(rename = "replacement-text", default)]
    pub replacement_text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct OptionsQuery {
    #[serde(rename = "settings-updated")]
    pub settings_updated: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub filter_terms: Option<String>,
    pub replacement_text: String,
    pub filter_active: bool,
    pub term_count: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/render", post(render))
        .route("/api/settings", get(api_settings))
        .route("/admin/word-filter", get(word_filter).post(save_word_filter))
        .route(OPTIONS_PAGE_PATH, get(options).post(save_options))
        .route(pages::STYLESHEET_PATH, get(stylesheet))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn stylesheet() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        WORD_FILTER_CSS,
    )
}

async fn render(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> Result<Json<RenderResponse>, (StatusCode, String)> {
    let settings = state
        .settings
        .load_filter_settings()
        .await
        .map_err(internal_error)?;

    let content = render_content(&settings, &request.content);
    debug!(
        filtered = content != request.content,
        bytes = request.content.len(),
        "content rendered"
    );

    Ok(Json(RenderResponse { content }))
}

async fn api_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, String)> {
    let principal = state.directory.authenticate(&headers);
    if !principal.can(Capability::ManageOptions) {
        return Ok(denied(&principal, pages::permission_denied_page()));
    }

    let settings = state
        .settings
        .load_filter_settings()
        .await
        .map_err(internal_error)?;

    let hook = ContentFilter::from_settings(&settings);
    let view = SettingsView {
        filter_active: hook.is_some(),
        term_count: hook.as_ref().map_or(0, ContentFilter::term_count),
        replacement_text: settings.replacement().to_owned(),
        filter_terms: settings.filter_terms,
    };
    Ok(Json(view).into_response())
}

async fn word_filter(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, String)> {
    let principal = state.directory.authenticate(&headers);
    if !principal.can(Capability::ManageOptions) {
        return Ok(denied(&principal, pages::permission_denied_page()));
    }

    word_filter_response(&state, &principal, StatusCode::OK, None).await
}

async fn save_word_filter(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<WordFilterForm>,
) -> Result<Response, (StatusCode, String)> {
    let principal = state.directory.authenticate(&headers);

    if form.submit.as_deref() != Some("true") {
        if !principal.can(Capability::ManageOptions) {
            return Ok(denied(&principal, pages::permission_denied_page()));
        }
        return word_filter_response(&state, &principal, StatusCode::OK, None).await;
    }

    let result = state
        .commands
        .save_filter_terms(
            &principal,
            form.nonce.as_deref(),
            form.plugin_words_to_filter.as_deref().unwrap_or_default(),
        )
        .await;

    match result {
        Ok(_) => {
            word_filter_response(&state, &principal, StatusCode::OK, Some(Notice::Saved)).await
        }
        Err(AdminError::PermissionDenied(_)) => {
            Ok(denied(&principal, pages::permission_denied_page()))
        }
        Err(AdminError::InvalidNonce) => {
            word_filter_response(
                &state,
                &principal,
                StatusCode::FORBIDDEN,
                Some(Notice::Denied),
            )
            .await
        }
        Err(AdminError::Store(error)) => Err(internal_error(error)),
    }
}

async fn options(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<OptionsQuery>,
) -> Result<Response, (StatusCode, String)> {
    let principal = state.directory.authenticate(&headers);
    if !principal.can(Capability::ManageOptions) {
        return Ok(denied(&principal, pages::permission_denied_page()));
    }

    let settings = state
        .settings
        .load_filter_settings()
        .await
        .map_err(internal_error)?;
    let nonce = state
        .commands
        .nonce_for(&principal, REPLACEMENT_FIELDS_ACTION);
    let saved = query.settings_updated.as_deref() == Some("true");

    Ok(Html(pages::options_page(settings.replacement(), &nonce, saved)).into_response())
}

async fn save_options(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ReplacementForm>,
) -> Result<Response, (StatusCode, String)> {
    let principal = state.directory.authenticate(&headers);

    match state
        .commands
        .save_replacement_text(&principal, form.nonce.as_deref(), &form.replacement_text)
        .await
    {
        Ok(()) => Ok(Redirect::to(&format!("{OPTIONS_PAGE_PATH}?settings-updated=true"))
            .into_response()),
        Err(AdminError::Store(error)) => Err(internal_error(error)),
        Err(_) => Ok(denied(&principal, pages::permission_denied_page())),
    }
}

async fn word_filter_response(
    state: &AppState,
    principal: &Principal,
    status: StatusCode,
    notice: Option<Notice>,
) -> Result<Response, (StatusCode, String)> {
    let settings = state
        .settings
        .load_filter_settings()
        .await
        .map_err(internal_error)?;
    let nonce = state.commands.nonce_for(principal, SAVE_TERMS_ACTION);
    let page = pages::word_filter_page(settings.filter_terms.as_deref(), &nonce, notice);

    Ok((status, Html(page)).into_response())
}

/// 401 with a Basic challenge when no credentials were presented, 403 when
/// the caller is known but lacks the capability.
fn denied(principal: &Principal, page: String) -> Response {
    if principal.is_anonymous() {
        let mut response = (StatusCode::UNAUTHORIZED, Html(page)).into_response();
        response.headers_mut().insert(
            header::WWW_AUTHENTICATE,
            HeaderValue::from_static("Basic realm=\"word-filter\""),
        );
        response
    } else {
        (StatusCode::FORBIDDEN, Html(page)).into_response()
    }
}

fn internal_error(error: anyhow::Error) -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("internal error: {error}"),
    )
}
