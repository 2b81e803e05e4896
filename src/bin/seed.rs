//! One-shot fixture loader: `seed [collections|page-mocks]`.

use std::env;

use dotenvy::dotenv;

use onp_portal::db::{establish_connection_pool, run_migrations};
use onp_portal::models::config::load_server_config;
use onp_portal::repository::DieselRepository;
use onp_portal::services::seed::{SeedMode, seed};

fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let mode = match env::args().nth(1) {
        Some(arg) => match arg.parse::<SeedMode>() {
            Ok(mode) => mode,
            Err(err) => {
                log::error!("{err}");
                std::process::exit(1);
            }
        },
        None => SeedMode::default(),
    };

    let server_config = match load_server_config() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {}", err);
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&pool) {
        log::error!("Failed to run migrations: {e}");
        std::process::exit(1);
    }

    let repo = DieselRepository::new(pool);

    match seed(&repo, mode, mode.fixtures()) {
        Ok(inserted) => log::info!("Seeded {inserted} document(s) ({mode:?})"),
        Err(e) => {
            log::error!("Seeding failed: {e}");
            std::process::exit(1);
        }
    }
}
