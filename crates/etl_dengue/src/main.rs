mod config;
mod load;
mod storage;

use anyhow::{Context, Result};
use dengue_core::models::sinan::{combine_aggregates, process_extract};
use log::{info, warn};

use crate::config::EtlConfig;
use crate::storage::BucketSource;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = EtlConfig::from_env()?;
    info!(
        "iniciando o pipeline de ETL da dengue (bucket '{}')",
        config.bucket_name
    );

    let source = BucketSource::connect(&config.bucket_name).await;
    let keys = source.list_extract_keys().await?;
    info!("{} arquivos .csv encontrados no bucket", keys.len());

    let mut aggregates = Vec::new();
    for key in &keys {
        // One bad file never aborts the run
        let bytes = match source.download(key).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("pulando '{key}': {err:#}");
                continue;
            }
        };

        match process_extract(&bytes) {
            Ok(aggregate) if aggregate.height() > 0 => {
                info!("'{key}': {} grupos agregados", aggregate.height());
                aggregates.push(aggregate);
            }
            Ok(_) => info!("'{key}': nenhum caso confirmado de dengue"),
            Err(err) => warn!("pulando '{key}': {err}"),
        }
    }

    let fact = combine_aggregates(aggregates)
        .context("nenhum arquivo produziu dados utilizáveis; tabela destino preservada")?;
    info!("{} registros agregados para carregar", fact.height());

    let mut client = load::connect(config.pg_config()).await?;
    let rows = load::fact_rows(&fact)?;
    load::replace_fact_table(&mut client, &rows).await?;

    info!("carga concluída com sucesso");
    Ok(())
}
