//! Reference catalog of instruments (ticker symbol + company name).
//!
//! Loaded once from a JSON array of `{"Symbol": ..., "Name": ...}` records and
//! read-only afterwards. Any malformed record fails the whole load.

use mention_core::{Instrument, MentionError, MentionResult};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    symbols: BTreeSet<String>,
    proper_names: BTreeSet<String>,
    name_by_symbol: HashMap<String, String>,
    symbol_by_name: HashMap<String, String>,
}

impl Catalog {
    /// Load a catalog from a JSON file on disk.
    pub fn load(path: impl AsRef<Path>) -> MentionResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            MentionError::DataLoad(format!("cannot read {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_json(&raw)?;
        tracing::info!(
            "Loaded {} instruments from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn from_json(raw: &str) -> MentionResult<Self> {
        let instruments: Vec<Instrument> = serde_json::from_str(raw)
            .map_err(|e| MentionError::DataLoad(format!("malformed catalog: {}", e)))?;
        Self::from_instruments(instruments)
    }

    pub fn from_instruments(instruments: Vec<Instrument>) -> MentionResult<Self> {
        let mut catalog = Catalog::default();

        for (i, inst) in instruments.into_iter().enumerate() {
            let symbol = inst.symbol.trim();
            let name = inst.name.trim();
            if symbol.is_empty() || name.is_empty() {
                return Err(MentionError::DataLoad(format!(
                    "record {} has an empty Symbol or Name",
                    i
                )));
            }
            if catalog.name_by_symbol.contains_key(symbol) {
                return Err(MentionError::DataLoad(format!(
                    "duplicate symbol {} at record {}",
                    symbol, i
                )));
            }

            // Names map back to exactly one symbol, so share classes need distinct names.
            if catalog.symbol_by_name.contains_key(name) {
                return Err(MentionError::DataLoad(format!(
                    "duplicate name {:?} at record {}",
                    name, i
                )));
            }

            catalog.symbols.insert(symbol.to_string());
            catalog.proper_names.insert(name.to_string());
            catalog
                .name_by_symbol
                .insert(symbol.to_string(), name.to_string());
            catalog
                .symbol_by_name
                .insert(name.to_string(), symbol.to_string());
        }

        Ok(catalog)
    }

    pub fn symbols(&self) -> &BTreeSet<String> {
        &self.symbols
    }

    pub fn proper_names(&self) -> &BTreeSet<String> {
        &self.proper_names
    }

    pub fn name_for(&self, symbol: &str) -> Option<&str> {
        self.name_by_symbol.get(symbol).map(String::as_str)
    }

    pub fn symbol_for(&self, name: &str) -> Option<&str> {
        self.symbol_by_name.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.name_by_symbol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_by_symbol.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"[
        {"Symbol": "AAPL", "Name": "Apple Inc", "Sector": "Information Technology"},
        {"Symbol": "GOOG", "Name": "Alphabet Inc. (Class C)"},
        {"Symbol": "GOOGL", "Name": "Alphabet Inc. (Class A)"},
        {"Symbol": "MSFT", "Name": "Microsoft Corp"}
    ]"#;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.symbols().len(), 4);
        assert_eq!(catalog.proper_names().len(), 4);
        assert!(catalog.symbols().contains("AAPL"));
    }

    #[test]
    fn test_missing_file_is_data_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Catalog::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, MentionError::DataLoad(_)));
    }

    #[test]
    fn test_record_missing_name_fails_whole_load() {
        let err = Catalog::from_json(r#"[{"Symbol":"AAPL","Name":"Apple Inc"},{"Symbol":"MSFT"}]"#)
            .unwrap_err();
        assert!(matches!(err, MentionError::DataLoad(_)));
    }

    #[test]
    fn test_non_array_source_is_rejected() {
        assert!(Catalog::from_json(r#"{"Symbol":"AAPL","Name":"Apple Inc"}"#).is_err());
        assert!(Catalog::from_json("not json").is_err());
    }

    #[test]
    fn test_blank_and_duplicate_symbols_are_rejected() {
        let blank = Catalog::from_json(r#"[{"Symbol":"  ","Name":"Ghost Corp"}]"#);
        assert!(matches!(blank, Err(MentionError::DataLoad(_))));

        let dup = Catalog::from_json(
            r#"[{"Symbol":"AAPL","Name":"Apple Inc"},{"Symbol":"AAPL","Name":"Apple"}]"#,
        );
        assert!(matches!(dup, Err(MentionError::DataLoad(_))));
    }

    #[test]
    fn test_duplicate_name_fails_whole_load() {
        let err = Catalog::from_json(
            r#"[{"Symbol":"GOOG","Name":"Alphabet Inc"},{"Symbol":"GOOGL","Name":"Alphabet Inc"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, MentionError::DataLoad(_)));

        // Trimming happens before the check
        let err = Catalog::from_json(
            r#"[{"Symbol":"GOOG","Name":"Alphabet Inc"},{"Symbol":"GOOGL","Name":" Alphabet Inc "}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, MentionError::DataLoad(_)));
    }

    #[test]
    fn test_reverse_lookups() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.name_for("MSFT"), Some("Microsoft Corp"));
        assert_eq!(catalog.symbol_for("Apple Inc"), Some("AAPL"));
        assert_eq!(catalog.symbol_for("Alphabet Inc. (Class A)"), Some("GOOGL"));
        assert_eq!(catalog.symbol_for("Alphabet Inc. (Class C)"), Some("GOOG"));
        assert_eq!(catalog.name_for("TSLA"), None);
        assert_eq!(catalog.symbol_for("Tesla Inc"), None);
    }

    #[test]
    fn test_symbol_name_round_trip() {
        let catalog = Catalog::from_json(
            r#"[{"Symbol":"AAPL","Name":"Apple Inc"},{"Symbol":"MSFT","Name":"Microsoft Corp"},{"Symbol":"BRK.B","Name":"Berkshire Hathaway"}]"#,
        )
        .unwrap();
        for symbol in catalog.symbols() {
            let name = catalog.name_for(symbol).unwrap();
            assert_eq!(catalog.symbol_for(name), Some(symbol.as_str()));
        }
    }

    #[test]
    fn test_bundled_catalog_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/s&p-500.json");
        let catalog = Catalog::load(path).unwrap();
        assert!(catalog.len() > 490);
        assert_eq!(catalog.name_for("IT"), Some("Gartner Inc"));
        assert_eq!(catalog.symbol_for("Apple Inc."), Some("AAPL"));
        for symbol in catalog.symbols() {
            let name = catalog.name_for(symbol).unwrap();
            assert_eq!(catalog.symbol_for(name), Some(symbol.as_str()));
        }
    }

    #[test]
    fn test_from_instruments_trims_fields() {
        let catalog = Catalog::from_instruments(vec![
            Instrument::new(" AAPL ", "Apple Inc "),
            Instrument::new("MSFT", "Microsoft Corp"),
        ])
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.name_for("AAPL"), Some("Apple Inc"));
        assert_eq!(catalog.symbol_for("Apple Inc"), Some("AAPL"));
    }

    #[test]
    fn test_empty_catalog_is_valid() {
        let catalog = Catalog::from_json("[]").unwrap();
        assert!(catalog.is_empty());
        assert!(catalog.symbols().is_empty());
    }
}
