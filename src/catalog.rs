use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::Error;
use crate::Result;

const NAME_COLUMN: &str = "Name";
const SYMBOL_COLUMN: &str = "Symbol";

/// A selectable instrument
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub symbol: String,
}

impl CatalogEntry {
    /// Selection label, e.g. `Apple Inc. (AAPL)`
    pub fn display(&self) -> String {
        format!("{} ({})", self.name, self.symbol)
    }
}

/// Static (name, symbol) list, read-only after load
#[derive(Debug, Clone, Default)]
pub struct SymbolCatalog {
    entries: Vec<CatalogEntry>,
}

impl SymbolCatalog {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| Error::Catalog(format!("cannot open {}: {}", path.display(), e)))?;

        let catalog = Self::from_reader(file)?;
        tracing::info!("Loaded {} symbols from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Parse CSV with at least `Name` and `Symbol` columns; header whitespace is ignored
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

        let headers = rdr.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| Error::Catalog(format!("missing column '{}'", name)))
        };
        let name_idx = column(NAME_COLUMN)?;
        let symbol_idx = column(SYMBOL_COLUMN)?;

        let mut entries = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let symbol = record.get(symbol_idx).unwrap_or_default();
            if symbol.is_empty() {
                tracing::debug!("Skipping catalog row without symbol at {:?}", record.position());
                continue;
            }

            entries.push(CatalogEntry {
                name: record.get(name_idx).unwrap_or_default().to_string(),
                symbol: symbol.to_string(),
            });
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find_by_display(&self, label: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.display() == label)
    }

    pub fn find_by_symbol(&self, symbol: &str) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .find(|e| e.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Case-insensitive substring match on name or symbol
    pub fn search(&self, query: &str) -> Vec<&CatalogEntry> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.entries.iter().collect();
        }

        self.entries
            .iter()
            .filter(|e| {
                e.name.to_lowercase().contains(&query) || e.symbol.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Resolve user input to an entry: exact symbol, display label, then a unique search hit
    pub fn resolve(&self, input: &str) -> Result<&CatalogEntry> {
        let input = input.trim();

        if let Some(entry) = self.find_by_symbol(input) {
            return Ok(entry);
        }
        if let Some(entry) = self.find_by_display(input) {
            return Ok(entry);
        }

        let hits = self.search(input);
        match hits.as_slice() {
            [entry] => Ok(*entry),
            _ => Err(Error::SymbolNotFound(input.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = " Name , Symbol ,Sector\n\
        Apple Inc.,AAPL,Technology\n\
        Microsoft Corporation,MSFT,Technology\n\
        Reliance Industries,RELIANCE.NS,Energy\n\
        Broken Row,,Unknown\n";

    fn catalog() -> SymbolCatalog {
        SymbolCatalog::from_reader(CSV.as_bytes()).unwrap()
    }

    #[test]
    fn test_headers_are_trimmed() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.entries()[0].symbol, "AAPL");
        assert_eq!(catalog.entries()[0].name, "Apple Inc.");
    }

    #[test]
    fn test_missing_column() {
        let result = SymbolCatalog::from_reader("Ticker,Name\nAAPL,Apple\n".as_bytes());
        match result {
            Err(Error::Catalog(msg)) => assert!(msg.contains("Symbol")),
            other => panic!("expected catalog error, got {:?}", other),
        }
    }

    #[test]
    fn test_display_label_lookup() {
        let catalog = catalog();
        let entry = catalog.find_by_display("Microsoft Corporation (MSFT)").unwrap();
        assert_eq!(entry.symbol, "MSFT");
    }

    #[test]
    fn test_search_by_name_or_symbol() {
        let catalog = catalog();
        assert_eq!(catalog.search("reliance").len(), 1);
        assert_eq!(catalog.search("ms").len(), 1);
        assert_eq!(catalog.search("").len(), 3);
        assert!(catalog.search("zzz").is_empty());
    }

    #[test]
    fn test_resolve() {
        let catalog = catalog();
        assert_eq!(catalog.resolve("aapl").unwrap().symbol, "AAPL");
        assert_eq!(catalog.resolve("Apple Inc. (AAPL)").unwrap().symbol, "AAPL");
        assert_eq!(catalog.resolve("micro").unwrap().symbol, "MSFT");
        // "c" appears in several entries
        assert!(matches!(catalog.resolve("c"), Err(Error::SymbolNotFound(_))));
    }
}
