//! HTTP handlers.
//!
//! `GET /` renders the dashboard, `POST /` applies a delete or rename form,
//! and `/audio/` serves the recording bytes.

use std::path::Path;

use actix_files::Files;
use actix_web::{HttpResponse, Responder, get, post, web};
use askama::Template;
use serde::Deserialize;

use crate::dashboard::{AUDIO_PREFIX, DashboardPage};
use crate::recordings::{delete_recording, list_recordings, redirect_home, rename_recording};
use crate::state::AppState;

/// Form fields submitted by the dashboard buttons.
#[derive(Debug, Default, Deserialize)]
pub struct RecordingForm {
    pub deleterecording: Option<String>,
    pub renamerecording: Option<String>,
    pub newname: Option<String>,
}

/// Render the recordings listing.
#[get("/")]
pub async fn dashboard(state: web::Data<AppState>) -> impl Responder {
    let cfg = &state.config;
    let page = match list_recordings(&cfg.recordings_dir) {
        Ok(recordings) => DashboardPage::listing(&cfg.organ_name, &recordings),
        Err(err) => {
            tracing::warn!(
                dir = %cfg.recordings_dir.display(),
                error = %err,
                "recordings inaccessible"
            );
            DashboardPage::inaccessible(&cfg.organ_name)
        }
    };
    match page.render() {
        Ok(html) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html),
        Err(err) => {
            tracing::error!(error = %err, "dashboard render failed");
            HttpResponse::InternalServerError().body("dashboard render failed")
        }
    }
}

/// Apply a delete or rename request, then send the browser back to `/`.
#[post("/")]
pub async fn update_recordings(
    state: web::Data<AppState>,
    form: web::Form<RecordingForm>,
) -> HttpResponse {
    let form = form.into_inner();
    let dir = &state.config.recordings_dir;

    let result = if let Some(name) = form.deleterecording.filter(|name| !name.is_empty()) {
        delete_recording(dir, &name).map(|path| {
            tracing::info!(path = %path.display(), "deleted recording");
        })
    } else if let Some(from) = form.renamerecording {
        let to = form.newname.unwrap_or_default();
        rename_recording(dir, &from, &to).map(|path| {
            tracing::info!(from = %from, path = %path.display(), "renamed recording");
        })
    } else {
        tracing::warn!("unhandled POST request");
        Ok(())
    };

    match result {
        Ok(()) => redirect_home(),
        Err(err) => {
            tracing::warn!(error = %err, "recording update failed");
            err.into_response()
        }
    }
}

/// Static file service for the recordings directory.
pub fn audio_files(dir: &Path) -> Files {
    Files::new(AUDIO_PREFIX, dir).use_hidden_files()
}
