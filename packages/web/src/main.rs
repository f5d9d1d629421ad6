use dioxus::prelude::*;

use ui::{GuardOutcome, SessionProvider, ToastHost};
use views::{AdminPanel, Dashboard, Login, Signup};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[route("/")]
    Home {},
    #[route("/login")]
    Login {},
    #[route("/signup")]
    Signup {},
    #[route("/admin")]
    Admin {},
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

const FAVICON: Asset = asset!("/assets/favicon.ico");

fn main() {
    #[cfg(feature = "server")]
    {
        tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(launch_server());
    }

    #[cfg(not(feature = "server"))]
    {
        dioxus::launch(App);
    }
}

#[cfg(feature = "server")]
async fn launch_server() {
    use dioxus::server::{DioxusRouterExt, ServeConfig};
    use std::time::Duration;
    use tower_sessions::cookie::SameSite;
    use tower_sessions::{Expiry, SessionManagerLayer};
    use tower_sessions_sqlx_store::PostgresStore;

    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // All six parameters are required; the Debug output redacts the API key.
    let config = match api::ServiceConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "service configuration incomplete");
            std::process::exit(1);
        }
    };
    tracing::info!(?config, "service configuration loaded");

    // Connect (with backoff) and migrate before accepting traffic
    let pool = api::db::init_pool()
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("../api/migrations")
        .run(pool)
        .await
        .expect("Failed to run migrations");

    // Create session store
    let session_store = PostgresStore::new(pool.clone());
    session_store
        .migrate()
        .await
        .expect("Failed to migrate session store");

    // Session layer configuration
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false) // Set to true in production with HTTPS
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(
            Duration::from_secs(60 * 60 * 24 * 7).try_into().unwrap(),
        )); // 7 days

    let router = axum::Router::new()
        .serve_dioxus_application(ServeConfig::new(), App)
        .layer(session_layer);

    // Use the address from dx serve or default to localhost:8080
    let addr = dioxus::cli_config::fullstack_address_or_localhost();
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router.into_make_service())
        .await
        .unwrap();
}

#[component]
fn App() -> Element {
    rsx! {
        // Global app resources
        document::Link { rel: "icon", href: FAVICON }
        document::Link { rel: "stylesheet", href: ui::MAIN_CSS }

        SessionProvider {
            ToastHost {
                Router::<Route> {}
            }
        }
    }
}

/// Renders its children only for a session the guard allows; otherwise
/// redirects. While the session is still resolving it renders nothing,
/// so a slow claims fetch never flashes a redirect or stale content.
#[component]
fn Guarded(#[props(default = false)] require_admin: bool, children: Element) -> Element {
    let session = ui::use_session();
    let nav = use_navigator();

    match GuardOutcome::decide(&session.state(), require_admin) {
        GuardOutcome::Pending => rsx! {},
        GuardOutcome::Allow => rsx! {
            {children}
        },
        GuardOutcome::RedirectLogin => {
            nav.replace(Route::Login {});
            rsx! {}
        }
        GuardOutcome::RedirectHome => {
            nav.replace(Route::Home {});
            rsx! {}
        }
    }
}

#[component]
fn Home() -> Element {
    rsx! {
        Guarded {
            Dashboard {}
        }
    }
}

#[component]
fn Admin() -> Element {
    rsx! {
        Guarded { require_admin: true,
            AdminPanel {}
        }
    }
}

/// Unknown paths land on the dashboard (or the login page via its guard).
#[component]
fn NotFound(segments: Vec<String>) -> Element {
    let nav = use_navigator();
    nav.replace(Route::Home {});
    rsx! {}
}
