use std::net::SocketAddr;

use dotenvy::dotenv;

use campusgate::config::database::init_db_pool;
use campusgate::config::security::SecurityConfig;
use campusgate::logging::init_tracing;
use campusgate::router::init_router;
use campusgate::state::AppState;
use campusgate::store::PgCredentialStore;
use campusgate::utils::crypto::{FieldEncryptor, migrate_encrypted_fields};

#[tokio::main]
async fn main() {
    dotenv().ok();

    let args: Vec<String> = std::env::args().collect();

    // Opt-in one-shot migration of legacy plaintext PII to the encrypted
    // envelope. Never runs as part of normal startup.
    if args.len() > 1 && args[1] == "migrate-encryption" {
        handle_migrate_encryption().await;
        return;
    }

    init_tracing();

    let state = match AppState::from_env().await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Failed to initialize application state: {}", e.error);
            std::process::exit(1);
        }
    };

    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    println!("Server running on http://localhost:3000");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}

async fn handle_migrate_encryption() {
    let pool = init_db_pool().await;
    let store = PgCredentialStore::new(pool);
    let security_config = SecurityConfig::from_env();
    let encryptor = FieldEncryptor::new(&security_config.encryption_key);

    match migrate_encrypted_fields(&store, &encryptor).await {
        Ok(count) => {
            println!("Encryption migration complete: {} record(s) updated", count);
        }
        Err(e) => {
            eprintln!("Encryption migration failed: {}", e.error);
            std::process::exit(1);
        }
    }
}
