use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use dengue_core::models::utils::date_from_days;
use log::info;
use polars::prelude::*;
use tokio_postgres::{Client, NoTls};

/// Destination fact table for the aggregated case counts.
pub const FACT_TABLE: &str = "fato_casos_dengue";

const CREATE_FACT_TABLE: &str = "CREATE TABLE IF NOT EXISTS fato_casos_dengue (
    ano_mes DATE NOT NULL,
    municipio_id INTEGER NOT NULL,
    casos_confirmados BIGINT NOT NULL,
    PRIMARY KEY (ano_mes, municipio_id)
)";

const INSERT_FACT_ROW: &str = "INSERT INTO fato_casos_dengue \
    (ano_mes, municipio_id, casos_confirmados) VALUES ($1, $2, $3)";

/// One row of the destination table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactRow {
    pub ano_mes: NaiveDate,
    pub municipio_id: i32,
    pub casos_confirmados: i64,
}

/// Opens a connection to the destination database and drives it on a
/// background task.
pub async fn connect(pg: tokio_postgres::Config) -> Result<Client> {
    let (client, connection) = pg
        .connect(NoTls)
        .await
        .context("falha ao conectar ao PostgreSQL")?;

    tokio::spawn(async move {
        if let Err(err) = connection.await {
            log::error!("conexão com o PostgreSQL encerrada com erro: {err}");
        }
    });

    Ok(client)
}

/// Converts the combined aggregate frame into typed rows for the load.
pub fn fact_rows(aggregate: &DataFrame) -> Result<Vec<FactRow>> {
    let ano_mes = aggregate.column("ano_mes")?.date()?;
    let municipios = aggregate.column("municipio_id")?.i64()?;
    let casos = aggregate.column("casos_confirmados")?.i64()?;

    let mut rows = Vec::with_capacity(aggregate.height());
    for idx in 0..aggregate.height() {
        let days = ano_mes
            .get(idx)
            .ok_or_else(|| anyhow!("ano_mes nulo na linha {idx}"))?;
        let ano_mes = date_from_days(days)
            .ok_or_else(|| anyhow!("ano_mes fora do intervalo na linha {idx}"))?;
        let municipio = municipios
            .get(idx)
            .ok_or_else(|| anyhow!("municipio_id nulo na linha {idx}"))?;
        let municipio_id = i32::try_from(municipio)
            .with_context(|| format!("municipio_id {municipio} não cabe em INTEGER"))?;
        let casos_confirmados = casos
            .get(idx)
            .ok_or_else(|| anyhow!("casos_confirmados nulo na linha {idx}"))?;

        rows.push(FactRow {
            ano_mes,
            municipio_id,
            casos_confirmados,
        });
    }

    Ok(rows)
}

/// Replaces the fact table's contents with the freshly computed rows.
///
/// Delete and inserts run in one transaction, so a failure rolls back
/// to the previous contents and concurrent readers never observe the
/// emptied table.
pub async fn replace_fact_table(client: &mut Client, rows: &[FactRow]) -> Result<()> {
    client
        .execute(CREATE_FACT_TABLE, &[])
        .await
        .context("falha ao garantir a tabela destino")?;

    let tx = client
        .transaction()
        .await
        .context("falha ao abrir transação")?;

    tx.execute("DELETE FROM fato_casos_dengue", &[])
        .await
        .context("falha ao limpar a tabela destino")?;

    let insert = tx
        .prepare(INSERT_FACT_ROW)
        .await
        .context("falha ao preparar o INSERT")?;

    for row in rows {
        tx.execute(
            &insert,
            &[&row.ano_mes, &row.municipio_id, &row.casos_confirmados],
        )
        .await
        .with_context(|| {
            format!(
                "falha ao inserir ({}, {})",
                row.ano_mes, row.municipio_id
            )
        })?;
    }

    tx.commit().await.context("falha ao confirmar a carga")?;
    info!("{} registros carregados em '{FACT_TABLE}'", rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_rows_conversion() {
        let march = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let april = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let aggregate = df!(
            "ano_mes" => [march, april],
            "municipio_id" => [330455i64, 355030],
            "casos_confirmados" => [8i64, 3],
        )
        .unwrap();

        let rows = fact_rows(&aggregate).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            FactRow {
                ano_mes: march,
                municipio_id: 330455,
                casos_confirmados: 8,
            }
        );
        assert_eq!(rows[1].municipio_id, 355030);
    }

    #[test]
    fn test_fact_rows_rejects_wrong_schema() {
        let aggregate = df!("municipio_id" => [330455i64]).unwrap();
        assert!(fact_rows(&aggregate).is_err());
    }

    #[test]
    fn test_fact_rows_rejects_oversized_municipality() {
        let march = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let aggregate = df!(
            "ano_mes" => [march],
            "municipio_id" => [i64::MAX],
            "casos_confirmados" => [1i64],
        )
        .unwrap();

        assert!(fact_rows(&aggregate).is_err());
    }
}
