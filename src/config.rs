use std::{env, path::PathBuf};

use crate::utils::file::default_allowed_extensions;

const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub upload_dir: PathBuf,
    pub max_file_size: u64,
    pub page_size: u32,
    pub allowed_extensions: Vec<String>,
}

impl Config {
    pub fn init() -> Result<Config, env::VarError> {
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;

        Ok(Config {
            database_url,
            port: parse_or("PORT", 8080),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./board-files")),
            max_file_size: parse_or("MAX_FILE_SIZE", DEFAULT_MAX_FILE_SIZE),
            page_size: parse_or("PAGE_SIZE", 10),
            allowed_extensions: env::var("ALLOWED_EXTENSIONS")
                .map(|raw| parse_extensions(&raw))
                .unwrap_or_else(|_| default_allowed_extensions()),
        })
    }

    #[cfg(test)]
    pub fn for_tests(upload_dir: impl Into<PathBuf>) -> Config {
        Config {
            database_url: String::new(),
            port: 0,
            db_max_connections: 1,
            upload_dir: upload_dir.into(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            page_size: 10,
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}
