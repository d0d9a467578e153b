mod config;
mod db;
mod output;

use anyhow::{Context, Result};
use dengue_core::models::municipios::{enrich, load_municipios};
use log::info;

use crate::config::DashboardConfig;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = DashboardConfig::from_env()?;
    info!("iniciando a preparação dos dados para o dashboard");

    let client = db::connect(config.pg_config()).await?;
    let cases = db::fetch_fact_table(&client).await?;
    info!("{} registros de casos carregados", cases.height());

    let reference = load_municipios(&config.municipios_path).with_context(|| {
        format!(
            "falha ao carregar municípios de '{}'",
            config.municipios_path.display()
        )
    })?;
    info!("{} municípios de referência carregados", reference.height());

    let mut enriched = enrich(cases, reference, config.unmatched_policy)?;
    info!(
        "{} registros prontos para visualização",
        enriched.height()
    );

    output::write_dashboard_csv(&mut enriched, &config.output_path)?;
    info!(
        "dados do dashboard salvos em '{}'",
        config.output_path.display()
    );

    Ok(())
}
