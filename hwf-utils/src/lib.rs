//! Shared utility functions for HWF crates.

/// Date utility functions
pub mod dates {
    use chrono::{NaiveDate, NaiveDateTime};

    /// Timestamp shapes accepted for historical observations, tried in order.
    pub const TIMESTAMP_FORMATS: [&str; 5] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y%m%d %H%M",
        "%d/%m/%Y %H:%M",
    ];

    /// Date-only shapes; these parse to midnight.
    pub const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y%m%d", "%d/%m/%Y"];

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?)
    }

    /// Parse an observation timestamp, with or without a time of day.
    pub fn parse_timestamp(s: &str) -> anyhow::Result<NaiveDateTime> {
        let s = s.trim();
        for format in TIMESTAMP_FORMATS {
            if let Ok(timestamp) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(timestamp);
            }
        }
        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, format) {
                return Ok(date.and_time(chrono::NaiveTime::MIN));
            }
        }
        anyhow::bail!("unrecognized timestamp: {s:?}")
    }

    /// Last day of a window of `days` days starting at `start`.
    ///
    /// A zero-day window ends the day before it starts, which yields an
    /// empty inclusive range.
    pub fn window_end(start: NaiveDate, days: u32) -> Option<NaiveDate> {
        match days {
            0 => start.pred_opt(),
            n => start.checked_add_days(chrono::Days::new(u64::from(n) - 1)),
        }
    }

}

/// Input decoding for plain or gzipped CSV files
pub mod input {
    use flate2::read::GzDecoder;
    use std::io::Read;
    use std::path::Path;

    /// First two bytes of every gzip stream.
    pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

    /// Returns true if the buffer starts with the gzip magic number.
    pub fn is_gzip(bytes: &[u8]) -> bool {
        bytes.starts_with(&GZIP_MAGIC)
    }

    /// Decode raw file bytes into UTF-8 text, inflating gzip data first.
    pub fn decode_text(bytes: &[u8]) -> anyhow::Result<String> {
        if is_gzip(bytes) {
            let mut text = String::new();
            GzDecoder::new(bytes).read_to_string(&mut text)?;
            Ok(text)
        } else {
            Ok(String::from_utf8(bytes.to_vec())?)
        }
    }

    /// Read a text file from disk, gzipped or not.
    pub fn read_text_file(path: impl AsRef<Path>) -> anyhow::Result<String> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        decode_text(&bytes)
    }

}
