pub mod geo;
pub mod municipios;
pub mod sinan;
pub mod utils;

pub use geo::{StateBR, UF_BY_CODE, shorten_ibge_code, uf_from_code, uf_lookup_frame};
pub use municipios::{UnmatchedPolicy, enrich, load_municipios, with_derived_columns};
pub use sinan::{
    CLASSI_FIN_CONFIRMADOS, DENGUE_AGRAVO, NOTIFICATION_COLUMNS, aggregate_confirmed,
    combine_aggregates, parse_notifications, process_extract,
};
pub use utils::{date_from_days, days_from_date, decode_latin1};
