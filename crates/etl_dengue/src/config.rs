use anyhow::{Context, Result};
use serde::Deserialize;

/// Runtime configuration for the extraction-aggregation-load stage.
///
/// Everything comes from `DENGUE_*` environment variables; only the
/// database password has no default.
#[derive(Debug, Clone)]
pub struct EtlConfig {
    pub bucket_name: String,
    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default = "default_bucket")]
    dengue_bucket: String,
    #[serde(default = "default_db_host")]
    dengue_db_host: String,
    #[serde(default = "default_db_port")]
    dengue_db_port: u16,
    #[serde(default = "default_db_user")]
    dengue_db_user: String,
    #[serde(default)]
    dengue_db_password: Option<String>,
    #[serde(default = "default_db_name")]
    dengue_db_name: String,
}

fn default_bucket() -> String {
    "dados-brutos-dengue-avv".to_string()
}

fn default_db_host() -> String {
    "localhost".to_string()
}

const fn default_db_port() -> u16 {
    5432
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_db_name() -> String {
    "dengue_db".to_string()
}

impl EtlConfig {
    pub fn from_env() -> Result<Self> {
        let raw: RawConfig =
            envy::from_env().context("failed to parse DENGUE_* environment variables")?;

        let db_password = raw
            .dengue_db_password
            .context("DENGUE_DB_PASSWORD must be set")?;

        Ok(Self {
            bucket_name: raw.dengue_bucket,
            db_host: raw.dengue_db_host,
            db_port: raw.dengue_db_port,
            db_user: raw.dengue_db_user,
            db_password,
            db_name: raw.dengue_db_name,
        })
    }

    /// Connection parameters for the destination database.
    pub fn pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.db_host)
            .port(self.db_port)
            .user(&self.db_user)
            .password(&self.db_password)
            .dbname(&self.db_name);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pg_config_carries_all_parameters() {
        let config = EtlConfig {
            bucket_name: "dados-brutos-dengue-avv".to_string(),
            db_host: "db.example.org".to_string(),
            db_port: 5433,
            db_user: "etl".to_string(),
            db_password: "secret".to_string(),
            db_name: "dengue_db".to_string(),
        };

        let pg = config.pg_config();
        assert_eq!(pg.get_ports(), &[5433]);
        assert_eq!(pg.get_user(), Some("etl"));
        assert_eq!(pg.get_dbname(), Some("dengue_db"));
    }

    #[test]
    fn test_defaults_match_original_deployment() {
        assert_eq!(default_bucket(), "dados-brutos-dengue-avv");
        assert_eq!(default_db_port(), 5432);
        assert_eq!(default_db_name(), "dengue_db");
    }
}
