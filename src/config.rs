use std::env;
use std::path::Path;

// Default configuration constants
pub const DEFAULT_MONGO_URL: &str = "mongodb://localhost:27017";

/// Role granted to the provisioned user on each database.
pub const READ_WRITE_ROLE: &str = "readWrite";

/// Service databases to provision, in creation order.
pub const TARGET_DATABASES: [&str; 3] = ["member_db", "chat_db", "streaming_db"];

pub fn load_env_file(env_file: Option<&str>) {
    if let Some(path) = env_file {
        dotenvy::from_path(Path::new(path)).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

/// Username for the provisioned users. Absent values come back as the
/// empty string; the server decides whether it accepts them.
pub fn get_root_username() -> String {
    env::var("MONGO_INITDB_ROOT_USERNAME").unwrap_or_default()
}

/// Password for the provisioned users, same absent-value behavior as the
/// username.
pub fn get_root_password() -> String {
    env::var("MONGO_INITDB_ROOT_PASSWORD").unwrap_or_default()
}

pub fn get_mongo_url() -> String {
    env::var("MONGO_URL").unwrap_or_else(|_| DEFAULT_MONGO_URL.to_string())
}
