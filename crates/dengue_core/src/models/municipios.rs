use std::path::Path;

use polars::prelude::*;
use serde::Deserialize;

use crate::errors::{CoreError, CoreResult};
use crate::models::geo::uf_lookup_frame;

/// What to do with aggregate rows whose municipality code has no match
/// in the reference table.
///
/// The original pipeline silently dropped them (inner join); keeping
/// them with null geographic fields is offered as an alternative since
/// the dropped rows are otherwise invisible to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    /// Inner join: unmatched aggregate rows are absent from the output.
    #[default]
    Drop,
    /// Left join: unmatched rows survive with null `nome` and `uf`.
    Keep,
}

impl std::str::FromStr for UnmatchedPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "keep" => Ok(Self::Keep),
            other => Err(format!(
                "política inválida '{other}': esperado 'drop' ou 'keep'"
            )),
        }
    }
}

/// Reads the local municipality reference CSV and attaches the derived
/// `uf` and `codigo_ibge_6d` columns.
///
/// The file must carry at least `codigo_ibge` (7-digit code), `nome`
/// and `codigo_uf` columns.
pub fn load_municipios<P: AsRef<Path>>(path: P) -> CoreResult<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
        .finish()?;

    with_derived_columns(df)
}

/// Derives the enrichment columns on a raw reference frame:
///
/// * `codigo_ibge_6d` — the 7-digit IBGE code integer-divided by 10,
///   matching the granularity SINAN uses for `municipio_id`;
/// * `uf` — the state abbreviation looked up from `codigo_uf`; codes
///   absent from the fixed table yield a null abbreviation.
pub fn with_derived_columns(reference: DataFrame) -> CoreResult<DataFrame> {
    for column in ["codigo_ibge", "nome", "codigo_uf"] {
        if reference.column(column).is_err() {
            return Err(CoreError::Schema(format!(
                "coluna '{column}' ausente no arquivo de municípios"
            )));
        }
    }

    let lookup = uf_lookup_frame()?;

    let derived = reference
        .lazy()
        .with_column(
            col("codigo_ibge")
                .floor_div(lit(10))
                .alias("codigo_ibge_6d"),
        )
        .join(
            lookup.lazy(),
            [col("codigo_uf")],
            [col("codigo_uf")],
            JoinArgs::new(JoinType::Left),
        )
        .collect()?;

    Ok(derived)
}

/// Joins the aggregate fact frame to the derived reference frame on
/// `municipio_id == codigo_ibge_6d`, attaching `nome` and `uf`.
///
/// With [`UnmatchedPolicy::Drop`] the join is inner, so the output
/// cardinality never exceeds the aggregate's and unmatched rows vanish.
pub fn enrich(
    cases: DataFrame,
    reference: DataFrame,
    policy: UnmatchedPolicy,
) -> CoreResult<DataFrame> {
    let join_type = match policy {
        UnmatchedPolicy::Drop => JoinType::Inner,
        UnmatchedPolicy::Keep => JoinType::Left,
    };

    let lookup = reference
        .lazy()
        .select([col("codigo_ibge_6d"), col("nome"), col("uf")]);

    let enriched = cases
        .lazy()
        .join(
            lookup,
            [col("municipio_id")],
            [col("codigo_ibge_6d")],
            JoinArgs::new(join_type),
        )
        .sort(["ano_mes", "municipio_id"], Default::default())
        .collect()?;

    Ok(enriched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn reference_frame() -> DataFrame {
        let raw = df!(
            "codigo_ibge" => [3304557i64, 3550308, 9999999],
            "nome" => ["Rio de Janeiro", "São Paulo", "Lugar Nenhum"],
            "codigo_uf" => [33i64, 35, 99],
        )
        .unwrap();
        with_derived_columns(raw).unwrap()
    }

    fn cases_frame() -> DataFrame {
        let march = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        df!(
            "ano_mes" => [march, march],
            "municipio_id" => [330455i64, 110001],
            "casos_confirmados" => [8i64, 2],
        )
        .unwrap()
    }

    #[test]
    fn test_with_derived_columns() {
        let reference = reference_frame();

        let six_digit = reference.column("codigo_ibge_6d").unwrap().i64().unwrap();
        assert_eq!(six_digit.get(0), Some(330455));
        assert_eq!(six_digit.get(1), Some(355030));

        let ufs = reference.column("uf").unwrap().str().unwrap();
        assert_eq!(ufs.get(0), Some("RJ"));
        assert_eq!(ufs.get(1), Some("SP"));
        // Code 99 is not a Brazilian state: null abbreviation, no error
        assert_eq!(ufs.get(2), None);
    }

    #[test]
    fn test_with_derived_columns_rejects_missing_schema() {
        let raw = df!("codigo_ibge" => [3304557i64], "nome" => ["Rio de Janeiro"]).unwrap();
        assert!(matches!(
            with_derived_columns(raw),
            Err(CoreError::Schema(_))
        ));
    }

    #[test]
    fn test_enrich_drops_unmatched_rows() {
        // 110001 (Alta Floresta d'Oeste) has no reference row here
        let enriched = enrich(cases_frame(), reference_frame(), UnmatchedPolicy::Drop).unwrap();

        assert_eq!(enriched.height(), 1);
        let nomes = enriched.column("nome").unwrap().str().unwrap();
        assert_eq!(nomes.get(0), Some("Rio de Janeiro"));
        let ufs = enriched.column("uf").unwrap().str().unwrap();
        assert_eq!(ufs.get(0), Some("RJ"));
    }

    #[test]
    fn test_enrich_keep_policy_retains_unmatched_rows() {
        let enriched = enrich(cases_frame(), reference_frame(), UnmatchedPolicy::Keep).unwrap();

        assert_eq!(enriched.height(), 2);
        let nomes = enriched.column("nome").unwrap().str().unwrap();
        // Sorted by municipio_id: the unmatched 110001 row comes first
        assert_eq!(nomes.get(0), None);
        assert_eq!(nomes.get(1), Some("Rio de Janeiro"));
    }

    #[test]
    fn test_enrich_output_never_exceeds_input() {
        let enriched = enrich(cases_frame(), reference_frame(), UnmatchedPolicy::Drop).unwrap();
        assert!(enriched.height() <= cases_frame().height());
    }

    #[test]
    fn test_load_municipios_from_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "codigo_ibge,nome,codigo_uf").unwrap();
        writeln!(file, "3304557,Rio de Janeiro,33").unwrap();
        writeln!(file, "3550308,São Paulo,35").unwrap();
        file.flush().unwrap();

        let reference = load_municipios(file.path()).unwrap();
        assert_eq!(reference.height(), 2);
        let ufs = reference.column("uf").unwrap().str().unwrap();
        assert_eq!(ufs.get(0), Some("RJ"));
    }

    #[test]
    fn test_unmatched_policy_from_str() {
        assert_eq!("drop".parse::<UnmatchedPolicy>(), Ok(UnmatchedPolicy::Drop));
        assert_eq!("KEEP".parse::<UnmatchedPolicy>(), Ok(UnmatchedPolicy::Keep));
        assert!("retain".parse::<UnmatchedPolicy>().is_err());
        assert_eq!(UnmatchedPolicy::default(), UnmatchedPolicy::Drop);
    }
}
