//! Prints a signed bearer token: `issue-token <role> <email> [name]`.

use std::env;

use dotenvy::dotenv;

use onp_portal::auth::{expires_in, issue_token};
use onp_portal::domain::auth::{ADMIN_ROLE, AuthenticatedUser, PHARMACIST_ROLE};
use onp_portal::models::config::load_server_config;

fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let args: Vec<String> = env::args().skip(1).collect();
    let (role, email) = match args.as_slice() {
        [role, email, ..] if role == ADMIN_ROLE || role == PHARMACIST_ROLE => (role, email),
        _ => {
            log::error!("usage: issue-token <{ADMIN_ROLE}|{PHARMACIST_ROLE}> <email> [name]");
            std::process::exit(1);
        }
    };
    let name = args.get(2).cloned().unwrap_or_else(|| email.clone());

    let server_config = match load_server_config() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {}", err);
            std::process::exit(1);
        }
    };

    let user = AuthenticatedUser {
        sub: email.clone(),
        name,
        email: email.clone(),
        roles: vec![role.clone()],
        exp: expires_in(server_config.token_ttl_secs),
    };

    match issue_token(&user, &server_config.secret) {
        Ok(token) => println!("{token}"),
        Err(e) => {
            log::error!("Failed to issue token: {e}");
            std::process::exit(1);
        }
    }
}
