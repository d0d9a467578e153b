use once_cell::sync::Lazy;
use polars::prelude::*;
use std::collections::HashMap;

use crate::errors::CoreResult;

/// Representation of a Brazilian Federative Unit (State).
///
/// # Fields
/// * `code` - IBGE numeric code of the state
/// * `name` - Full name of the state
/// * `uf` - State abbreviation (2 letters)
///
/// # Example
/// ```rust
/// use dengue_core::models::geo::StateBR;
///
/// let rio = StateBR::new(33, "Rio de Janeiro", "RJ");
/// assert_eq!(rio.code, 33);
/// assert_eq!(rio.uf, "RJ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateBR {
    pub code: u8,
    pub name: &'static str,
    pub uf: &'static str,
}

impl StateBR {
    pub const fn new(code: u8, name: &'static str, uf: &'static str) -> Self {
        Self { code, name, uf }
    }
}

/// Mapping of IBGE numeric state codes to their complete state data.
/// 26 states plus the Distrito Federal; total and unchanging.
pub static UF_BY_CODE: Lazy<HashMap<u8, StateBR>> = Lazy::new(|| {
    let mut ufs = HashMap::new();
    ufs.insert(11, StateBR::new(11, "Rondônia", "RO"));
    ufs.insert(12, StateBR::new(12, "Acre", "AC"));
    ufs.insert(13, StateBR::new(13, "Amazonas", "AM"));
    ufs.insert(14, StateBR::new(14, "Roraima", "RR"));
    ufs.insert(15, StateBR::new(15, "Pará", "PA"));
    ufs.insert(16, StateBR::new(16, "Amapá", "AP"));
    ufs.insert(17, StateBR::new(17, "Tocantins", "TO"));
    ufs.insert(21, StateBR::new(21, "Maranhão", "MA"));
    ufs.insert(22, StateBR::new(22, "Piauí", "PI"));
    ufs.insert(23, StateBR::new(23, "Ceará", "CE"));
    ufs.insert(24, StateBR::new(24, "Rio Grande do Norte", "RN"));
    ufs.insert(25, StateBR::new(25, "Paraíba", "PB"));
    ufs.insert(26, StateBR::new(26, "Pernambuco", "PE"));
    ufs.insert(27, StateBR::new(27, "Alagoas", "AL"));
    ufs.insert(28, StateBR::new(28, "Sergipe", "SE"));
    ufs.insert(29, StateBR::new(29, "Bahia", "BA"));
    ufs.insert(31, StateBR::new(31, "Minas Gerais", "MG"));
    ufs.insert(32, StateBR::new(32, "Espírito Santo", "ES"));
    ufs.insert(33, StateBR::new(33, "Rio de Janeiro", "RJ"));
    ufs.insert(35, StateBR::new(35, "São Paulo", "SP"));
    ufs.insert(41, StateBR::new(41, "Paraná", "PR"));
    ufs.insert(42, StateBR::new(42, "Santa Catarina", "SC"));
    ufs.insert(43, StateBR::new(43, "Rio Grande do Sul", "RS"));
    ufs.insert(50, StateBR::new(50, "Mato Grosso do Sul", "MS"));
    ufs.insert(51, StateBR::new(51, "Mato Grosso", "MT"));
    ufs.insert(52, StateBR::new(52, "Goiás", "GO"));
    ufs.insert(53, StateBR::new(53, "Distrito Federal", "DF"));
    ufs
});

/// Get the UF abbreviation for an IBGE numeric state code.
///
/// A code outside the fixed table yields `None`, never an error; callers
/// surface that as a missing `uf` value.
///
/// # Example
/// ```rust
/// use dengue_core::models::geo::uf_from_code;
///
/// assert_eq!(uf_from_code(35), Some("SP"));
/// assert_eq!(uf_from_code(99), None);
/// ```
pub fn uf_from_code(code: i64) -> Option<&'static str> {
    let code = u8::try_from(code).ok()?;
    UF_BY_CODE.get(&code).map(|state| state.uf)
}

/// Drops the trailing verification digit of a 7-digit IBGE municipality
/// code, yielding the 6-digit form used by SINAN notifications.
///
/// # Example
/// ```rust
/// use dengue_core::models::geo::shorten_ibge_code;
///
/// assert_eq!(shorten_ibge_code(3304557), 330455);
/// ```
pub const fn shorten_ibge_code(code: i64) -> i64 {
    code / 10
}

/// Materializes the UF lookup as a two-column DataFrame
/// (`codigo_uf`, `uf`) so it can be applied columnwise with a join.
pub fn uf_lookup_frame() -> CoreResult<DataFrame> {
    let mut states: Vec<&StateBR> = UF_BY_CODE.values().collect();
    states.sort_by_key(|state| state.code);

    let codes: Vec<i64> = states.iter().map(|state| state.code as i64).collect();
    let ufs: Vec<&str> = states.iter().map(|state| state.uf).collect();

    Ok(df!("codigo_uf" => codes, "uf" => ufs)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uf_by_code_mapping() {
        assert_eq!(UF_BY_CODE.len(), 27); // 26 states + 1 federal district

        let sp = UF_BY_CODE.get(&35).unwrap();
        assert_eq!(sp.name, "São Paulo");
        assert_eq!(sp.uf, "SP");

        let rj = UF_BY_CODE.get(&33).unwrap();
        assert_eq!(rj.name, "Rio de Janeiro");
        assert_eq!(rj.uf, "RJ");
    }

    #[test]
    fn test_uf_from_code() {
        assert_eq!(uf_from_code(35), Some("SP"));
        assert_eq!(uf_from_code(33), Some("RJ"));
        assert_eq!(uf_from_code(53), Some("DF"));

        // Missing codes yield None, not an error
        assert_eq!(uf_from_code(0), None);
        assert_eq!(uf_from_code(34), None);
        assert_eq!(uf_from_code(99), None);
        assert_eq!(uf_from_code(-1), None);
        assert_eq!(uf_from_code(10_000), None);
    }

    #[test]
    fn test_shorten_ibge_code() {
        assert_eq!(shorten_ibge_code(3304557), 330455);
        assert_eq!(shorten_ibge_code(3550308), 355030);
        // Remainder is discarded, not rounded
        assert_eq!(shorten_ibge_code(3304559), 330455);
    }

    #[test]
    fn test_uf_lookup_frame() {
        let lookup = uf_lookup_frame().unwrap();
        assert_eq!(lookup.height(), 27);
        assert_eq!(lookup.get_column_names_str(), &["codigo_uf", "uf"]);

        let codes = lookup.column("codigo_uf").unwrap().i64().unwrap();
        // Sorted by code, so Rondônia comes first and DF last
        assert_eq!(codes.get(0), Some(11));
        assert_eq!(codes.get(26), Some(53));
    }
}
