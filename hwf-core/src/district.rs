use crate::error::Result;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

/// A geographic district that receives the heat-wave overlay.
///
/// Only the identity is kept here; boundaries and their coordinate
/// reference system belong to the map renderer.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct District {
    pub district_id: String,
    pub name: String,
}

impl District {
    /// Parse a delimited district list with a header row.
    ///
    /// Expected columns: district_id, name (optional; defaults to the id).
    /// Rows with an empty id are skipped.
    pub fn parse_district_csv(csv_object: &str, delimiter: u8) -> Result<Vec<District>> {
        let mut district_list: Vec<District> = Vec::new();
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_object.as_bytes());
        for row in rdr.records() {
            let record = row?;
            let district_id = record.get(0).unwrap_or("").trim();
            if district_id.is_empty() {
                continue;
            }
            let name = record
                .get(1)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or(district_id);
            district_list.push(District {
                district_id: district_id.to_string(),
                name: name.to_string(),
            });
        }
        Ok(district_list)
    }
}
