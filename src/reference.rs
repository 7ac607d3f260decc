//! Reference word-frequency corpus (SUBTLEX-style `word,nchar,zipf,dompos` table).

use std::collections::HashMap;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{Error, Result};
use crate::tokens::{PER_MILLION, fpmw_from_zipf};

/// Default location of the reference table, relative to the working directory.
pub const DEFAULT_REFERENCE_FILE: &str = "zipfFreqs.csv";

/// Marker written for values that are not available.
pub const NOT_AVAILABLE: &str = "NA";

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceEntry {
    /// Length column as listed; `None` when it is not a number.
    pub nchar: Option<usize>,
    pub zipf: f64,
    pub dom_pos: String,
}

/// Reference values for one word, back-derived from its Zipf value.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceMatch {
    pub proportion: f64,
    pub fpmw: f64,
    pub zipf: f64,
    pub dom_pos: String,
}

impl ReferenceMatch {
    /// Report cells: proportion, fpmw, zipf, DomPoS.
    pub fn cells(&self) -> [String; 4] {
        [
            self.proportion.to_string(),
            self.fpmw.to_string(),
            self.zipf.to_string(),
            self.dom_pos.clone(),
        ]
    }

    /// Cells for a word the corpus does not know.
    pub fn missing_cells() -> [String; 4] {
        [NOT_AVAILABLE; 4].map(String::from)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceCorpus {
    entries: HashMap<String, ReferenceEntry>,
}

impl ReferenceCorpus {
    /// Loads the table at `path`. The first row is a header; extra columns are ignored.
    pub fn load(path: &Path) -> Result<Self> {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|e| Error::Reference {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Self::from_reader(reader).map_err(|reason| Error::Reference {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn from_reader<R: std::io::Read>(
        mut reader: csv::Reader<R>,
    ) -> std::result::Result<Self, String> {
        let mut entries = HashMap::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| e.to_string())?;
            // header is row 1
            let row = i + 2;
            if record.len() < 4 {
                return Err(format!("row {row}: expected 4 columns, found {}", record.len()));
            }
            let word = record[0].trim().to_lowercase();
            let nchar = record[1].trim().parse::<usize>().ok();
            if nchar.is_none() {
                log::debug!("row {row}: ignoring non-numeric length '{}'", &record[1]);
            }
            let zipf = record[2]
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("row {row}: bad zipf '{}': {e}", &record[2]))?;
            let entry = ReferenceEntry {
                nchar,
                zipf,
                dom_pos: record[3].trim().to_string(),
            };
            if entries.insert(word.clone(), entry).is_some() {
                log::debug!("duplicate reference word '{word}' at row {row}, keeping later row");
            }
        }
        log::info!("imported {} reference entries", entries.len());
        Ok(ReferenceCorpus { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, word: &str) -> Option<&ReferenceEntry> {
        self.entries.get(&word.to_lowercase())
    }

    /// Looks a word up; absence is not an error.
    pub fn lookup(&self, word: &str) -> Option<ReferenceMatch> {
        self.get(word).map(|entry| {
            let fpmw = fpmw_from_zipf(entry.zipf);
            ReferenceMatch {
                proportion: fpmw / PER_MILLION,
                fpmw,
                zipf: entry.zipf,
                dom_pos: entry.dom_pos.clone(),
            }
        })
    }
}
