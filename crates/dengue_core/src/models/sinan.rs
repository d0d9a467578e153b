use std::io::Cursor;
use std::sync::Arc;

use polars::prelude::*;

use crate::errors::{CoreError, CoreResult};
use crate::models::utils::decode_latin1;

/// CID-10 code identifying dengue in the SINAN agravo field.
pub const DENGUE_AGRAVO: &str = "A90";

/// Final-classification codes treated as a confirmed dengue case.
///
/// 1 = laboratory confirmed, 10 = dengue, 11 = dengue with warning
/// signs, 12 = severe dengue (SINAN dictionary).
pub const CLASSI_FIN_CONFIRMADOS: [i64; 4] = [1, 10, 11, 12];

/// Column holding the disease/condition (agravo) code.
pub const COL_ID_AGRAVO: &str = "ID_AGRAVO";
/// Column holding the notification date.
pub const COL_DT_NOTIFIC: &str = "DT_NOTIFIC";
/// Column holding the final classification code.
pub const COL_CLASSI_FIN: &str = "CLASSI_FIN";
/// Column holding the residence-municipality IBGE code (6 digits).
pub const COL_ID_MN_RESI: &str = "ID_MN_RESI";

/// The only columns the pipeline reads from a SINAN extract.
pub const NOTIFICATION_COLUMNS: [&str; 4] =
    [COL_ID_AGRAVO, COL_DT_NOTIFIC, COL_CLASSI_FIN, COL_ID_MN_RESI];

/// Reads a raw SINAN extract (Latin-1 delimited text) into a DataFrame
/// restricted to [`NOTIFICATION_COLUMNS`], with notification dates
/// parsed to the Date dtype.
///
/// Restricting the projection up front keeps malformed values in the
/// hundred-plus remaining SINAN columns from failing the parse.
pub fn parse_notifications(bytes: &[u8]) -> CoreResult<DataFrame> {
    let utf8 = decode_latin1(bytes);

    let projection: Vec<PlSmallStr> = NOTIFICATION_COLUMNS
        .iter()
        .copied()
        .map(PlSmallStr::from_static)
        .collect();

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_columns(Some(Arc::from(projection)))
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(b',')
                .with_try_parse_dates(true),
        )
        .into_reader_with_file_handle(Cursor::new(utf8.into_bytes()))
        .finish()?;

    Ok(df)
}

/// Applies the aggregation rule to a parsed notification frame.
///
/// Keeps rows whose agravo equals [`DENGUE_AGRAVO`] and whose final
/// classification is one of [`CLASSI_FIN_CONFIRMADOS`], truncates the
/// notification date to the first day of its month, groups by
/// (`ano_mes`, `municipio_id`) and counts rows as `casos_confirmados`.
/// Groups with a missing municipality code are excluded.
pub fn aggregate_confirmed(notifications: DataFrame) -> CoreResult<DataFrame> {
    let confirmados = Series::new("confirmados".into(), CLASSI_FIN_CONFIRMADOS);

    let aggregated = notifications
        .lazy()
        .filter(col(COL_ID_AGRAVO).eq(lit(DENGUE_AGRAVO)))
        .filter(col(COL_CLASSI_FIN).is_in(lit(confirmados)))
        .group_by([
            col(COL_DT_NOTIFIC).dt().truncate(lit("1mo")).alias("ano_mes"),
            col(COL_ID_MN_RESI).alias("municipio_id"),
        ])
        .agg([len().cast(DataType::Int64).alias("casos_confirmados")])
        .filter(col("municipio_id").is_not_null())
        .collect()?;

    Ok(aggregated)
}

/// Parses one raw extract and aggregates it in a single step.
pub fn process_extract(bytes: &[u8]) -> CoreResult<DataFrame> {
    aggregate_confirmed(parse_notifications(bytes)?)
}

/// Combines per-file aggregates into the final fact set.
///
/// The frames are concatenated and re-grouped by (`ano_mes`,
/// `municipio_id`) with `casos_confirmados` summed, so a municipality/
/// month pair that spans two source files collapses to one row with the
/// combined count. Sum is associative, so feeding an already-combined
/// result back through is a fixpoint.
///
/// An empty input (or an input that combines to zero rows) is an error:
/// the caller must abort before touching the destination table.
pub fn combine_aggregates(frames: Vec<DataFrame>) -> CoreResult<DataFrame> {
    if frames.is_empty() {
        return Err(CoreError::EmptyAggregate(
            "nenhum arquivo produziu agregados".to_string(),
        ));
    }

    let lazy_frames: Vec<LazyFrame> = frames.into_iter().map(|df| df.lazy()).collect();

    let combined = concat(lazy_frames, UnionArgs::default())?
        .group_by([col("ano_mes"), col("municipio_id")])
        .agg([col("casos_confirmados").sum()])
        .sort(["ano_mes", "municipio_id"], Default::default())
        .collect()?;

    if combined.height() == 0 {
        return Err(CoreError::EmptyAggregate(
            "agregado final vazio".to_string(),
        ));
    }

    Ok(combined)
}
