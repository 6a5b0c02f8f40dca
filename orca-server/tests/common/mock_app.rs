use std::sync::Arc;

use axum::Router;

use orca_server::app::build_router;
use orca_server::configs::settings::{Auth, Database, Logger, Mailer, Realtime, Server, Settings};
use orca_server::configs::storage::Storage;
use orca_server::models::User;
use orca_server::services::TokenService;
use orca_server::tests::{create_test_user, setup_test_db};

pub struct MockApp {
    pub storage: Arc<Storage>,
    pub router: Router,
    pub user: User,
    pub token: String,
}

fn test_settings() -> Settings {
    Settings {
        server: Server {
            host: String::from("127.0.0.1"),
            port: 0,
        },
        logger: Logger {
            level: String::from("debug"),
        },
        database: Database {
            migration_path: None,
            clean_start: true,
            url: String::from("sqlite::memory:"),
        },
        auth: Auth {
            secret: String::from("test"),
            expiration: 1000,
        },
        mailer: Mailer {
            enabled: false,
            endpoint: String::new(),
            from_address: String::from("noreply@orca.local"),
            from_name: String::from("Orca"),
        },
        realtime: Realtime {
            enabled: false,
            endpoint: String::new(),
        },
    }
}

impl MockApp {
    pub async fn new() -> Self {
        let storage = setup_test_db().await;
        let settings = test_settings();
        let router = build_router(storage.clone(), &settings);

        let user = create_test_user(storage.clone(), "operator", "viewer").await;
        let token_service = TokenService::new(settings.auth.clone());
        let token = token_service.generate_token(&user).unwrap().token;

        Self {
            storage,
            router,
            user,
            token,
        }
    }
}
