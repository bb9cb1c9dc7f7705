//! Actix server startup + app wiring.
//!
//! Resolves the configuration, registers the dashboard routes and the
//! `/audio` file server, and installs request logging and Ctrl+C handling.

use std::path::PathBuf;
use std::time::Instant;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::{Next, from_fn};
use actix_web::{App, Error, HttpServer, web};
use anyhow::{Context, Result};

use crate::api;
use crate::config::{self, ConfigFile, OrganConfig};
use crate::dashboard::AUDIO_PREFIX;
use crate::state::AppState;

/// Resolve config and run the HTTP server until shutdown.
pub(crate) async fn run(args: crate::Args) -> Result<()> {
    let cfg = resolve_config(&args)?;
    tracing::info!(
        bind = %args.bind,
        recordings_dir = %cfg.recordings_dir.display(),
        organ_name = %cfg.organ_name,
        "starting organ-http"
    );

    let recordings_dir = cfg.recordings_dir.clone();
    let state = web::Data::new(AppState::new(cfg));
    setup_shutdown();

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(from_fn(log_requests))
            .service(api::dashboard)
            .service(api::update_recordings)
            .service(api::audio_files(&recordings_dir))
    })
    .bind(args.bind)
    .with_context(|| format!("bind {}", args.bind))?
    .run()
    .await?;

    Ok(())
}

/// Layer defaults, config files and command-line overrides.
fn resolve_config(args: &crate::Args) -> Result<OrganConfig> {
    let home = config::home_dir();
    let mut cfg = OrganConfig::discover(home.as_deref());
    if let Some(path) = args.config.as_ref() {
        cfg.apply(ConfigFile::load(path)?);
    }
    apply_overrides(&mut cfg, args.recordings_dir.clone(), args.organ_name.clone());
    Ok(cfg)
}

fn apply_overrides(cfg: &mut OrganConfig, dir: Option<PathBuf>, organ_name: Option<String>) {
    if let Some(dir) = dir {
        cfg.recordings_dir = dir;
    }
    if let Some(name) = organ_name {
        cfg.organ_name = name;
    }
}

/// Media fetches are range-heavy; keep them out of the info log.
fn is_media_path(path: &str) -> bool {
    path == AUDIO_PREFIX
        || path
            .strip_prefix(AUDIO_PREFIX)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Log each request through `tracing`.
async fn log_requests(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let path = req.path().to_string();
    let method = req.method().clone();
    let peer = req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or("-")
        .to_string();
    let start = Instant::now();
    let res = next.call(req).await?;
    let status = res.status().as_u16();
    let elapsed_ms = start.elapsed().as_millis() as u64;
    if is_media_path(&path) {
        tracing::debug!(%method, %path, status, %peer, elapsed_ms, "http request");
    } else {
        tracing::info!(%method, %path, status, %peer, elapsed_ms, "http request");
    }
    Ok(res)
}

/// Stop the actix system on Ctrl+C.
fn setup_shutdown() {
    let result = ctrlc::set_handler(|| {
        if let Some(system) = actix_web::rt::System::try_current() {
            system.stop();
        } else {
            std::process::exit(0);
        }
    });
    if let Err(err) = result {
        tracing::warn!(error = %err, "failed to install Ctrl+C handler");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::HttpResponse;
    use actix_web::http::StatusCode;

    #[test]
    fn media_paths_are_detected() {
        assert!(is_media_path("/audio/take.wav"));
        assert!(is_media_path("/audio"));
        assert!(!is_media_path("/"));
        assert!(!is_media_path("/audiobook"));
    }

    #[test]
    fn overrides_replace_resolved_values() {
        let mut cfg = OrganConfig::defaults(None);
        apply_overrides(
            &mut cfg,
            Some(PathBuf::from("/srv/recordings")),
            Some("Nave Organ".to_string()),
        );
        assert_eq!(cfg.recordings_dir, PathBuf::from("/srv/recordings"));
        assert_eq!(cfg.organ_name, "Nave Organ");
    }

    #[test]
    fn absent_overrides_keep_values() {
        let mut cfg = OrganConfig::defaults(None);
        let before = cfg.clone();
        apply_overrides(&mut cfg, None, None);
        assert_eq!(cfg, before);
    }

    #[actix_web::test]
    async fn request_logging_passes_responses_through() {
        let app = actix_web::test::init_service(
            App::new()
                .wrap(from_fn(log_requests))
                .route("/", web::get().to(|| async { HttpResponse::Ok().body("ok") })),
        )
        .await;
        let req = actix_web::test::TestRequest::get().uri("/").to_request();
        let resp = actix_web::test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = actix_web::test::TestRequest::get()
            .uri("/audio/missing.wav")
            .to_request();
        let resp = actix_web::test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
