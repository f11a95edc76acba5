use std::env;
use std::path::PathBuf;

use anyhow::bail;
use importer::Dialect;

pub const MOVIES_FILE: &str = "movies.json";
pub const CONTACTS_FILE: &str = "contacts.json";

#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub data_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub public_dir: PathBuf,
    pub admin: AdminCredentials,
    pub csv_dialect: Dialect,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| env::var(key).unwrap_or_else(|_| default.to_string());

        Ok(Self {
            bind: var("API_BIND", "127.0.0.1:3000"),
            data_dir: var("DATA_DIR", "data").into(),
            uploads_dir: var("UPLOADS_DIR", "uploads").into(),
            public_dir: var("PUBLIC_DIR", "public").into(),
            admin: AdminCredentials {
                username: var("ADMIN_USERNAME", "admin"),
                password: var("ADMIN_PASSWORD", "admin123"),
            },
            csv_dialect: parse_dialect(&var("CSV_DIALECT", "simple"))?,
        })
    }

    pub fn movies_path(&self) -> PathBuf {
        self.data_dir.join(MOVIES_FILE)
    }

    pub fn contacts_path(&self) -> PathBuf {
        self.data_dir.join(CONTACTS_FILE)
    }
}

fn parse_dialect(value: &str) -> anyhow::Result<Dialect> {
    match value.trim().to_ascii_lowercase().as_str() {
        "simple" | "" => Ok(Dialect::Simple),
        "rfc4180" => Ok(Dialect::Rfc4180),
        other => bail!("CSV_DIALECT must be 'simple' or 'rfc4180', got '{}'", other),
    }
}
