#![allow(dead_code)]

//! Loader for captured PNG scanline logs.
//!
//! Each fixture describes one 8-bit image as a header of `key = value` lines
//! followed by, per row, `filter = N`, `data = [...]` (the filtered payload)
//! and `expected = [...]` (the unfiltered pixels). A line starting with
//! `PASS:` ends the log.

use std::fs;
use std::path::{Path, PathBuf};

/// One captured image: filtered scanlines and the pixels they decode to.
#[derive(Debug, Default)]
pub struct ScanlineLog {
    pub width: usize,
    pub bit_depth: usize,
    pub channels: usize,
    pub color_type: u8,
    pub pixel_depth: usize,
    pub rowbytes: usize,
    /// Tag-prefixed scanlines, ready for the predictor stage
    pub data: Vec<u8>,
    /// Unfiltered pixel bytes
    pub expected: Vec<u8>,
    /// Filter tag of each row, in order
    pub filters: Vec<u8>,
}

impl ScanlineLog {
    pub fn rows(&self) -> usize {
        self.filters.len()
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.pixel_depth / 8
    }
}

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

pub fn load_scanline_log(name: &str) -> ScanlineLog {
    let path = fixtures_dir().join(name);
    let text = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("read fixture {}: {}", path.display(), e));
    parse_scanline_log(&text)
}

pub fn parse_scanline_log(text: &str) -> ScanlineLog {
    let mut log = ScanlineLog::default();
    let mut filter = 0u8;

    for line in text.lines() {
        if line.starts_with("PASS:") {
            break;
        }
        let Some((key, value)) = line.split_once(" = ") else {
            continue;
        };
        let value = value.trim();
        match key {
            "width" => log.width = value.parse().unwrap(),
            "bit_depth" => log.bit_depth = value.parse().unwrap(),
            "channels" => log.channels = value.parse().unwrap(),
            "color_type" => log.color_type = value.parse().unwrap(),
            "pixel_depth" => log.pixel_depth = value.parse().unwrap(),
            "rowbytes" => log.rowbytes = value.parse().unwrap(),
            "filter" => filter = value.parse().unwrap(),
            "data" => {
                log.data.push(filter);
                log.data.extend(parse_byte_list(value));
                log.filters.push(filter);
            },
            "expected" => log.expected.extend(parse_byte_list(value)),
            other => panic!("unknown fixture key {:?}", other),
        }
    }

    log
}

fn parse_byte_list(value: &str) -> Vec<u8> {
    value
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u8>().unwrap())
        .collect()
}

/// Prefix a row payload with its filter tag.
pub fn with_filter(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut row = Vec::with_capacity(payload.len() + 1);
    row.push(tag);
    row.extend_from_slice(payload);
    row
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scanline_log() {
        let text = "width = 2\nbit_depth = 8\nchannels = 1\ncolor_type = 0\n\
                    pixel_depth = 8\nrowbytes = 2\nfilter = 1\ndata = [1, 1]\n\
                    expected = [1, 2]\nPASS: 1 rows\nfilter = 0\n";
        let log = parse_scanline_log(text);
        assert_eq!(log.width, 2);
        assert_eq!(log.data, vec![1, 1, 1]);
        assert_eq!(log.expected, vec![1, 2]);
        assert_eq!(log.filters, vec![1]);
    }
}
