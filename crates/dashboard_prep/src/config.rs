use anyhow::{Context, Result};
use dengue_core::models::municipios::UnmatchedPolicy;
use serde::Deserialize;
use std::path::PathBuf;

/// Runtime configuration for the dashboard-preparation stage.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    pub municipios_path: PathBuf,
    pub output_path: PathBuf,
    pub unmatched_policy: UnmatchedPolicy,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
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
    #[serde(default = "default_municipios_path")]
    dengue_municipios_path: PathBuf,
    #[serde(default = "default_output_path")]
    dengue_output_path: PathBuf,
    #[serde(default)]
    dengue_unmatched_policy: Option<String>,
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

fn default_municipios_path() -> PathBuf {
    PathBuf::from("lookup_data/municipios.csv")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("dados_dashboard_dengue.csv")
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self> {
        let raw: RawConfig =
            envy::from_env().context("failed to parse DENGUE_* environment variables")?;

        let db_password = raw
            .dengue_db_password
            .context("DENGUE_DB_PASSWORD must be set")?;

        let unmatched_policy = match raw.dengue_unmatched_policy {
            Some(value) => value
                .parse()
                .map_err(|err: String| anyhow::anyhow!(err))
                .context("invalid DENGUE_UNMATCHED_POLICY")?,
            None => UnmatchedPolicy::default(),
        };

        Ok(Self {
            db_host: raw.dengue_db_host,
            db_port: raw.dengue_db_port,
            db_user: raw.dengue_db_user,
            db_password,
            db_name: raw.dengue_db_name,
            municipios_path: raw.dengue_municipios_path,
            output_path: raw.dengue_output_path,
            unmatched_policy,
        })
    }

    /// Connection parameters for the source database.
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
    fn test_defaults_match_original_paths() {
        assert_eq!(
            default_municipios_path(),
            PathBuf::from("lookup_data/municipios.csv")
        );
        assert_eq!(
            default_output_path(),
            PathBuf::from("dados_dashboard_dengue.csv")
        );
    }

    #[test]
    fn test_pg_config_carries_all_parameters() {
        let config = DashboardConfig {
            db_host: "localhost".to_string(),
            db_port: 5432,
            db_user: "postgres".to_string(),
            db_password: "secret".to_string(),
            db_name: "dengue_db".to_string(),
            municipios_path: default_municipios_path(),
            output_path: default_output_path(),
            unmatched_policy: UnmatchedPolicy::Drop,
        };

        let pg = config.pg_config();
        assert_eq!(pg.get_user(), Some("postgres"));
        assert_eq!(pg.get_dbname(), Some("dengue_db"));
        assert_eq!(pg.get_ports(), &[5432]);
    }
}
