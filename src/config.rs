use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub backend_url: String,
    pub anon_key: String,
    pub access_token: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            backend_url: try_load("GEORESTO_BACKEND_URL", "http://localhost:54321"),
            anon_key: load_key("GEORESTO_ANON_KEY"),
            access_token: env::var("GEORESTO_ACCESS_TOKEN").ok(),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

// The publishable key is read from the environment, or from a mounted
// secret file when running under compose/swarm.
fn load_key(key: &str) -> String {
    if let Ok(value) = env::var(key) {
        return value;
    }

    read_secret(key)
}

fn read_secret(secret_name: &str) -> String {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Failed to read {secret_name} from file: {e}");
        })
        .expect("Secrets misconfigured!")
}
