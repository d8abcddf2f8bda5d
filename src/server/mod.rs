pub mod routes;
pub mod sessions;
pub mod view;

use crate::{config::Config, error::Result, studio::Studio};
use actix_web::{middleware, web, App, HttpServer};
use chrono::Duration;

pub use sessions::{GenerationTicket, SessionRegistry, SESSION_COOKIE};
pub use view::PageRenderer;

pub struct AppState {
    pub studio: Studio,
    pub sessions: SessionRegistry,
    pub pages: PageRenderer,
}

impl AppState {
    pub fn new(studio: Studio, session_ttl: Duration) -> Result<Self> {
        Ok(Self {
            studio,
            sessions: SessionRegistry::new(session_ttl),
            pages: PageRenderer::new()?,
        })
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(routes::index))
        .route("/health", web::get().to(routes::health))
        .route("/generate", web::post().to(routes::generate))
        .route("/random", web::post().to(routes::random_prompt))
        .route("/settings", web::post().to(routes::update_settings))
        .route("/history/clear", web::post().to(routes::clear_history))
        .route(
            "/history/{index}/reuse",
            web::post().to(routes::reuse_history_item),
        )
        .route(
            "/history/{index}/delete",
            web::post().to(routes::delete_history_item),
        )
        .route("/images/{id}", web::get().to(routes::image))
        .route("/download/latest", web::get().to(routes::download_latest))
        .route(
            "/download/history/{index}",
            web::get().to(routes::download_history_item),
        );
}

pub async fn run(config: Config, studio: Studio) -> Result<()> {
    let state = web::Data::new(AppState::new(
        studio,
        Duration::minutes(config.session_ttl_minutes),
    )?);
    let address = config.bind_address();

    log::info!("🌐 Listening on http://{}", address);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::new("%r %s %Dms"))
            .configure(configure)
    })
    .bind(&address)?
    .run()
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::studio::test_support::MockBackend;
    use crate::studio::NoticeLevel;
    use actix_web::cookie::Cookie;
    use actix_web::http::{header, StatusCode};
    use actix_web::test;
    use std::sync::Arc;
    use std::time::Duration as StdDuration;
    use uuid::Uuid;

    fn app_state(backend: Arc<MockBackend>) -> web::Data<AppState> {
        let studio = Studio::new(backend, "test/model");
        web::Data::new(AppState::new(studio, Duration::minutes(30)).unwrap())
    }

    fn session_of(cookie: &Cookie<'_>) -> Uuid {
        Uuid::parse_str(cookie.value()).unwrap()
    }

    macro_rules! session_cookie {
        ($resp:expr) => {
            $resp
                .response()
                .cookies()
                .find(|c| c.name() == SESSION_COOKIE)
                .map(|c| c.into_owned())
                .expect("session cookie")
        };
    }

    #[actix_web::test]
    async fn test_index_starts_session() {
        let state = app_state(Arc::new(MockBackend::succeeding()));
        let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = session_cookie!(resp);
        assert_eq!(state.sessions.len(), 1);

        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("AI Image Generator"));

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/").cookie(cookie.clone()).to_request(),
        )
        .await;
        assert_eq!(session_cookie!(resp).value(), cookie.value());
        assert_eq!(state.sessions.len(), 1);
    }

    #[actix_web::test]
    async fn test_generate_flow() {
        let backend = Arc::new(MockBackend::succeeding());
        let state = app_state(backend.clone());
        let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/generate")
                .set_form([
                    ("prompt", "A cat"),
                    ("negative_prompt", "  "),
                    ("style", "Anime"),
                    ("size", "landscape"),
                ])
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
        let cookie = session_cookie!(resp);

        let sent = backend.last_request().unwrap();
        assert!(sent.prompt.starts_with("A cat, anime style"));
        assert_eq!((sent.width, sent.height), (768, 512));
        assert_eq!(sent.negative_prompt, None);

        let session = state.sessions.snapshot(session_of(&cookie));
        assert_eq!(session.history.len(), 1);
        assert_eq!(session.style, "Anime");

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/download/latest")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
        let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap();
        assert!(disposition.to_str().unwrap().contains("generated_image.png"));

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/download/history/0")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap();
        assert!(disposition.to_str().unwrap().contains("generated_1.png"));

        let image_uri = session.last_result.as_ref().unwrap().image_path();
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&image_uri)
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
        assert!(resp.headers().get(header::CONTENT_DISPOSITION).is_none());

        let resp = test::call_service(&app, test::TestRequest::get().uri(&image_uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/download/history/3")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_empty_prompt_is_blocked() {
        let backend = Arc::new(MockBackend::succeeding());
        let state = app_state(backend.clone());
        let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/generate")
                .set_form([("prompt", "   "), ("negative_prompt", "")])
                .to_request(),
        )
        .await;
        let cookie = session_cookie!(resp);

        assert_eq!(backend.calls(), 0);
        let session = state.sessions.snapshot(session_of(&cookie));
        assert!(session.history.is_empty());
        assert_eq!(session.notice.unwrap().level, NoticeLevel::Warning);
    }

    #[actix_web::test]
    async fn test_failed_generation_reports_category() {
        let backend = Arc::new(MockBackend::failing(GenerationError::RateLimited(
            "429".into(),
        )));
        let state = app_state(backend);
        let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/generate")
                .set_form([("prompt", "A cat")])
                .to_request(),
        )
        .await;
        let cookie = session_cookie!(resp);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/").cookie(cookie.clone()).to_request(),
        )
        .await;
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("Rate limit exceeded!"));

        let session = state.sessions.snapshot(session_of(&cookie));
        assert!(session.notice.is_none());
        assert!(session.history.is_empty());
        assert_eq!(session.prompt_draft, "A cat");
    }

    #[actix_web::test]
    async fn test_one_generation_per_session_at_a_time() {
        let backend = Arc::new(MockBackend::slow(StdDuration::from_millis(200)));
        let state = app_state(backend.clone());
        let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let cookie = session_cookie!(resp);
        let id = session_of(&cookie);

        let generate = |prompt: &'static str| {
            test::TestRequest::post()
                .uri("/generate")
                .cookie(cookie.clone())
                .set_form([("prompt", prompt)])
                .to_request()
        };
        let (first, second) = tokio::join!(
            test::call_service(&app, generate("first")),
            test::call_service(&app, generate("second")),
        );
        assert_eq!(first.status(), StatusCode::SEE_OTHER);
        assert_eq!(second.status(), StatusCode::SEE_OTHER);

        assert_eq!(backend.calls(), 1);
        assert!(!state.sessions.is_generating(id));
        let session = state.sessions.snapshot(id);
        assert_eq!(session.history.len(), 1);
        assert_eq!(
            session.history.get(0).unwrap().raw_prompt,
            backend.last_request().unwrap().prompt
        );

        test::call_service(&app, generate("third")).await;
        assert_eq!(backend.calls(), 2);
        assert_eq!(state.sessions.snapshot(id).history.len(), 2);
    }

    #[actix_web::test]
    async fn test_clear_during_generation_is_kept() {
        let backend = Arc::new(MockBackend::slow(StdDuration::from_millis(200)));
        let state = app_state(backend);
        let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let cookie = session_cookie!(resp);
        let id = session_of(&cookie);

        let generate = |prompt: &'static str| {
            test::TestRequest::post()
                .uri("/generate")
                .cookie(cookie.clone())
                .set_form([("prompt", prompt)])
                .to_request()
        };
        test::call_service(&app, generate("old")).await;
        assert_eq!(state.sessions.snapshot(id).history.len(), 1);

        let clear = async {
            tokio::time::sleep(StdDuration::from_millis(50)).await;
            test::call_service(
                &app,
                test::TestRequest::post()
                    .uri("/history/clear")
                    .cookie(cookie.clone())
                    .to_request(),
            )
            .await
        };
        tokio::join!(test::call_service(&app, generate("new")), clear);

        let session = state.sessions.snapshot(id);
        assert_eq!(session.history.len(), 1);
        assert_eq!(session.history.get(0).unwrap().raw_prompt, "new");
    }

    #[actix_web::test]
    async fn test_history_actions() {
        let backend = Arc::new(MockBackend::succeeding());
        let state = app_state(backend);
        let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let cookie = session_cookie!(resp);
        let id = session_of(&cookie);

        for prompt in ["first", "second", "third"] {
            test::call_service(
                &app,
                test::TestRequest::post()
                    .uri("/generate")
                    .cookie(cookie.clone())
                    .set_form([("prompt", prompt)])
                    .to_request(),
            )
            .await;
        }
        assert_eq!(state.sessions.snapshot(id).history.len(), 3);

        test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/history/2/reuse")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(state.sessions.snapshot(id).prompt_draft, "first");

        test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/history/0/delete")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        let session = state.sessions.snapshot(id);
        assert_eq!(session.history.len(), 2);
        assert_eq!(session.history.get(0).unwrap().raw_prompt, "second");

        test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/history/9/reuse")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        let session = state.sessions.snapshot(id);
        assert_eq!(session.prompt_draft, "first");
        assert_eq!(session.notice.unwrap().level, NoticeLevel::Error);

        test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/history/clear")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert!(state.sessions.snapshot(id).history.is_empty());
    }

    #[actix_web::test]
    async fn test_random_prompt_and_settings() {
        let state = app_state(Arc::new(MockBackend::succeeding()));
        let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/random")
                .set_form([("prompt", "my draft"), ("size", "portrait")])
                .to_request(),
        )
        .await;
        let cookie = session_cookie!(resp);
        let id = session_of(&cookie);

        let session = state.sessions.snapshot(id);
        assert_ne!(session.prompt_draft, "my draft");
        assert!(crate::studio::prompt::RANDOM_PROMPTS.contains(&session.prompt_draft.as_str()));
        assert_eq!(session.size, crate::models::ImageSize::Portrait);

        test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/settings")
                .cookie(cookie.clone())
                .set_form([("prompt", "kept"), ("style", "Nonexistent")])
                .to_request(),
        )
        .await;
        let rejected = state.sessions.snapshot(id);
        assert_eq!(rejected.prompt_draft, session.prompt_draft);
        assert!(matches!(rejected.notice, Some(ref n) if n.level == NoticeLevel::Error));
        assert_ne!(rejected.style, "Nonexistent");
    }

    #[actix_web::test]
    async fn test_health() {
        let state = app_state(Arc::new(MockBackend::succeeding()));
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["model"], "test/model");
        assert_eq!(body["backend"], "mock");
    }
}
