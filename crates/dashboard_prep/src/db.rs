use anyhow::{Context, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use tokio_postgres::{Client, NoTls};

const SELECT_FACT_TABLE: &str =
    "SELECT ano_mes, municipio_id, casos_confirmados FROM fato_casos_dengue";

/// Opens a connection to the source database and drives it on a
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

/// Reads the whole fact table back into a DataFrame with the same
/// column names and dtypes the load stage produced.
pub async fn fetch_fact_table(client: &Client) -> Result<DataFrame> {
    let rows = client
        .query(SELECT_FACT_TABLE, &[])
        .await
        .context("falha ao ler a tabela fato_casos_dengue")?;

    let mut ano_mes: Vec<NaiveDate> = Vec::with_capacity(rows.len());
    let mut municipios: Vec<i64> = Vec::with_capacity(rows.len());
    let mut casos: Vec<i64> = Vec::with_capacity(rows.len());

    for row in &rows {
        ano_mes.push(row.try_get::<_, NaiveDate>(0)?);
        municipios.push(i64::from(row.try_get::<_, i32>(1)?));
        casos.push(row.try_get::<_, i64>(2)?);
    }

    let df = df!(
        "ano_mes" => ano_mes,
        "municipio_id" => municipios,
        "casos_confirmados" => casos,
    )?;

    Ok(df)
}
