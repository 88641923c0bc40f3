//! Stream decoders for Flate-compressed, PNG-predicted streams.
//!
//! Decoding runs in two stages:
//! - FlateDecode (zlib/deflate) inflates the payload
//! - the PNG predictor stage reverses per-scanline filtering
//!
//! Both stages have a robust and a legacy (strict) behavior, selected through
//! [`DecodeOptions`]. Results are returned as a [`DecodeOutcome`] so callers can
//! inspect partial output alongside the error that truncated it.

use crate::decode_options::DecodeOptions;
use crate::error::{Error, Result};

mod flate;
mod predictor;

pub use flate::{FlateDecoder, Inflated};
pub use predictor::{
    paeth_predictor, reconstruct, unfilter_row, DecodeParams, PngFilter, RowGeometry,
};

/// Trait for PDF stream decoders.
///
/// Each decoder implements one stage of the pipeline and turns its input into
/// decoded bytes.
pub trait StreamDecoder {
    /// Decode the input data.
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>>;

    /// Get the name of this decoder (e.g., "FlateDecode").
    fn name(&self) -> &str;
}

/// Result of a decode: the reconstructed bytes, the error, or both.
///
/// | data    | error   | meaning                                         |
/// |---------|---------|-------------------------------------------------|
/// | `Some`  | `None`  | full success                                    |
/// | `Some`  | `Some`  | recovered: complete rows only, error says why   |
/// | `None`  | `Some`  | fatal, nothing usable                           |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOutcome {
    /// Reconstructed bytes, `None` if the decode failed outright
    pub data: Option<Vec<u8>>,
    /// What went wrong, `None` on full success
    pub error: Option<Error>,
}

impl DecodeOutcome {
    fn ok(data: Vec<u8>) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    fn partial(data: Vec<u8>, error: Error) -> Self {
        Self {
            data: Some(data),
            error: Some(error),
        }
    }

    fn failed(error: Error) -> Self {
        Self {
            data: None,
            error: Some(error),
        }
    }

    /// True when the stream decoded without any error.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Treat any error as a failure, discarding partial output.
    pub fn into_result(self) -> Result<Vec<u8>> {
        match (self.data, self.error) {
            (_, Some(error)) => Err(error),
            (Some(data), None) => Ok(data),
            (None, None) => Ok(Vec::new()),
        }
    }

    /// Keep whatever output was produced, failing only when there is none.
    pub fn into_best_effort(self) -> Result<Vec<u8>> {
        match (self.data, self.error) {
            (Some(data), Some(error)) => {
                log::warn!("Using partial decode ({} bytes): {}", data.len(), error);
                Ok(data)
            },
            (Some(data), None) => Ok(data),
            (None, Some(error)) => Err(error),
            (None, None) => Ok(Vec::new()),
        }
    }
}

/// Inflate and unpredict a stream with the robust decoder.
///
/// If the zlib data was damaged and a fallback inflate strategy supplied the
/// bytes, the reconstructed rows are returned next to an
/// [`Error::Decompression`] describing the recovery.
///
/// # Examples
///
/// ```rust
/// use flate2::write::ZlibEncoder;
/// use flate2::Compression;
/// use flate_png::decoders::{decode_flate_png, DecodeParams};
/// use std::io::Write;
///
/// // One Sub-filtered row of three gray pixels
/// let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
/// encoder.write_all(&[1, 10, 1, 1]).unwrap();
/// let compressed = encoder.finish().unwrap();
///
/// let outcome = decode_flate_png(&compressed, &DecodeParams::png(12, 3, 1, 8));
/// assert!(outcome.is_ok());
/// assert_eq!(outcome.data.unwrap(), vec![10, 11, 12]);
/// ```
pub fn decode_flate_png(data: &[u8], params: &DecodeParams) -> DecodeOutcome {
    decode_flate_png_with_options(data, params, &DecodeOptions::lenient())
}

/// Inflate and unpredict a stream with the legacy decoder.
///
/// Fails outright on anything the robust decoder would recover from, and on
/// Average and Paeth rows.
pub fn decode_flate_png_legacy(data: &[u8], params: &DecodeParams) -> DecodeOutcome {
    decode_flate_png_with_options(data, params, &DecodeOptions::strict())
}

/// Inflate and unpredict a stream.
///
/// # Security
///
/// The inflated size is checked against the ratio and size limits in
/// `options` before any predictor work is done. [`decode_flate_png`] and
/// [`decode_flate_png_legacy`] only cap the size; pass
/// [`DecodeOptions::with_ratio_limit`] here to enforce a ratio.
pub fn decode_flate_png_with_options(
    data: &[u8],
    params: &DecodeParams,
    options: &DecodeOptions,
) -> DecodeOutcome {
    let decoder = if options.strict {
        FlateDecoder::strict()
    } else {
        FlateDecoder::new()
    };

    let Inflated {
        data: inflated,
        recovered,
    } = match decoder.inflate(data) {
        Ok(inflated) => inflated,
        Err(e) => return DecodeOutcome::failed(e),
    };
    let inflated = match check_limits(data.len(), inflated, options) {
        Ok(inflated) => inflated,
        Err(e) => return DecodeOutcome::failed(e),
    };

    let outcome = unfilter_png(&inflated, params, options);
    match recovered {
        // Damaged compressed data outranks any row-level complaint
        Some(error) => DecodeOutcome {
            data: outcome.data,
            error: Some(error),
        },
        None => outcome,
    }
}

/// Reverse PNG prediction on already-inflated data.
///
/// Non-PNG predictor codes pass the data through untouched. A trailing
/// partial row is dropped in lenient mode and reported as
/// [`Error::StreamLengthMismatch`] next to the complete rows; with no complete
/// row, or in strict mode, the mismatch is fatal.
pub fn unfilter_png(data: &[u8], params: &DecodeParams, options: &DecodeOptions) -> DecodeOutcome {
    if !params.is_png() {
        if params.predictor != 1 {
            log::warn!(
                "Predictor {} is not a PNG predictor, passing {} bytes through",
                params.predictor,
                data.len()
            );
        }
        return DecodeOutcome::ok(data.to_vec());
    }

    let geometry = match params.geometry() {
        Ok(geometry) => geometry,
        Err(e) => return DecodeOutcome::failed(e),
    };
    log::debug!(
        "PNG predictor {}: {} bytes, bpp {}, stride {}",
        params.predictor,
        data.len(),
        geometry.bytes_per_pixel,
        geometry.stride
    );

    let row_len = geometry.row_len();
    let rows = data.len() / row_len;
    let mut mismatch = None;

    if !data.len().is_multiple_of(row_len) {
        let error = Error::StreamLengthMismatch {
            len: data.len(),
            row_len,
            rows,
        };
        if options.strict || rows == 0 {
            return DecodeOutcome::failed(error);
        }
        log::warn!(
            "Dropping {} trailing bytes of incomplete scanline",
            data.len() - rows * row_len
        );
        mismatch = Some(error);
    }

    match reconstruct(&data[..rows * row_len], geometry, options.strict) {
        Ok(output) => match mismatch {
            Some(error) => DecodeOutcome::partial(output, error),
            None => DecodeOutcome::ok(output),
        },
        Err(e) => DecodeOutcome::failed(e),
    }
}

fn check_limits(
    compressed_size: usize,
    inflated: Vec<u8>,
    options: &DecodeOptions,
) -> Result<Vec<u8>> {
    let max_ratio = options.max_decompression_ratio;
    if max_ratio > 0 {
        let ratio = inflated.len() as u64 / compressed_size.max(1) as u64;
        if ratio > max_ratio as u64 {
            return Err(Error::LimitExceeded(format!(
                "ratio {}:1 exceeds limit {}:1 (compressed: {} bytes, decompressed: {} bytes)",
                ratio,
                max_ratio,
                compressed_size,
                inflated.len()
            )));
        }
    }

    let max_size = options.max_decompressed_size;
    if max_size > 0 && inflated.len() > max_size {
        return Err(Error::LimitExceeded(format!(
            "decompressed size {} bytes exceeds limit {} bytes",
            inflated.len(),
            max_size
        )));
    }

    Ok(inflated)
}

/// Predictor stage as a [`StreamDecoder`] over already-inflated data.
///
/// Lenient options return best-effort output; strict options turn any error
/// into a failure.
#[derive(Debug, Clone, Default)]
pub struct PngPredictorDecoder {
    /// Predictor parameters from the stream dictionary
    pub params: DecodeParams,
    /// Strictness and limits
    pub options: DecodeOptions,
}

impl PngPredictorDecoder {
    /// Create a predictor decoder.
    pub fn new(params: DecodeParams, options: DecodeOptions) -> Self {
        Self { params, options }
    }
}

impl StreamDecoder for PngPredictorDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let outcome = unfilter_png(input, &self.params, &self.options);
        if self.options.strict {
            outcome.into_result()
        } else {
            outcome.into_best_effort()
        }
    }

    fn name(&self) -> &str {
        "PNGPredictor"
    }
}

/// Decode stream data through its filter list and optional predictor.
///
/// Only FlateDecode (or its abbreviation `Fl`) is handled here; any other
/// filter name is rejected with [`Error::UnsupportedFilter`].
///
/// # Examples
///
/// ```rust
/// use flate_png::decode_options::DecodeOptions;
/// use flate_png::decoders::decode_stream_with_options;
///
/// let result = decode_stream_with_options(b"raw", &[], None, &DecodeOptions::default());
/// assert_eq!(result.unwrap(), b"raw");
/// ```
pub fn decode_stream_with_options(
    data: &[u8],
    filters: &[String],
    params: Option<&DecodeParams>,
    options: &DecodeOptions,
) -> Result<Vec<u8>> {
    let mut current = data.to_vec();

    for filter_name in filters {
        let decoder = match filter_name.as_str() {
            "FlateDecode" | "Fl" if options.strict => FlateDecoder::strict(),
            "FlateDecode" | "Fl" => FlateDecoder::new(),
            _ => return Err(Error::UnsupportedFilter(filter_name.clone())),
        };

        current = decoder.decode(&current)?;
        current = check_limits(data.len(), current, options)?;
    }

    match params {
        Some(params) if params.predictor != 1 => {
            PngPredictorDecoder::new(params.clone(), *options).decode(&current)
        },
        _ => Ok(current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn gray(columns: usize) -> DecodeParams {
        DecodeParams::png(12, columns, 1, 8)
    }

    #[test]
    fn test_unfilter_passes_through_non_png() {
        let data = b"Hello, World!";
        for predictor in [1, 2, 9, 16] {
            let params = DecodeParams {
                predictor,
                ..Default::default()
            };
            let outcome = unfilter_png(data, &params, &DecodeOptions::strict());
            assert_eq!(outcome, DecodeOutcome::ok(data.to_vec()));
        }
    }

    #[test]
    fn test_unfilter_empty_stream() {
        for options in [DecodeOptions::strict(), DecodeOptions::lenient()] {
            let outcome = unfilter_png(&[], &gray(4), &options);
            assert_eq!(outcome, DecodeOutcome::ok(Vec::new()));
        }
    }

    #[test]
    fn test_unfilter_unsupported_bit_depth() {
        let params = DecodeParams::png(12, 8, 1, 1);
        let outcome = unfilter_png(&[0, 1], &params, &DecodeOptions::lenient());
        assert_eq!(outcome, DecodeOutcome::failed(Error::UnsupportedBitDepth(1)));
    }

    #[test]
    fn test_unfilter_truncated_lenient() {
        let data = [0, 1, 2, 3, 2, 1, 1]; // one row plus 3 stray bytes
        let outcome = unfilter_png(&data, &gray(3), &DecodeOptions::lenient());
        assert_eq!(outcome.data, Some(vec![1, 2, 3]));
        assert_eq!(
            outcome.error,
            Some(Error::StreamLengthMismatch {
                len: 7,
                row_len: 4,
                rows: 1
            })
        );
    }

    #[test]
    fn test_unfilter_truncated_strict() {
        let data = [0, 1, 2, 3, 2, 1, 1];
        let outcome = unfilter_png(&data, &gray(3), &DecodeOptions::strict());
        assert!(outcome.data.is_none());
        assert!(matches!(outcome.error, Some(Error::StreamLengthMismatch { .. })));
    }

    #[test]
    fn test_unfilter_shorter_than_one_row() {
        let outcome = unfilter_png(&[1, 2], &gray(3), &DecodeOptions::lenient());
        assert_eq!(
            outcome,
            DecodeOutcome::failed(Error::StreamLengthMismatch {
                len: 2,
                row_len: 4,
                rows: 0
            })
        );
    }

    #[test]
    fn test_decode_flate_png_decompression_error() {
        let outcome = decode_flate_png(b"This is not zlib compressed data", &gray(3));
        assert!(outcome.data.is_none());
        assert!(matches!(outcome.error, Some(Error::Decompression(_))));
    }

    #[test]
    fn test_decode_flate_png_ratio_limit() {
        let compressed = zlib(&[0u8; 64 * 1024]);
        for outcome in [
            decode_flate_png(&compressed, &gray(255)),
            decode_flate_png_legacy(&compressed, &gray(255)),
        ] {
            assert!(outcome.is_ok());
            assert_eq!(outcome.data.map(|d| d.len()), Some(256 * 255));
        }

        let options = DecodeOptions::lenient().with_ratio_limit(100);
        let outcome = decode_flate_png_with_options(&compressed, &gray(255), &options);
        assert!(outcome.data.is_none());
        assert!(matches!(outcome.error, Some(Error::LimitExceeded(_))));
    }

    #[test]
    fn test_decode_flate_png_reports_fallback_inflate() {
        let mut encoder = flate2::write::DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&[0, 1, 2, 3, 2, 1, 1, 1]).unwrap();
        let raw = encoder.finish().unwrap();

        let outcome = decode_flate_png(&raw, &gray(3));
        assert_eq!(outcome.data, Some(vec![1, 2, 3, 2, 3, 4]));
        assert!(matches!(outcome.error, Some(Error::Decompression(_))));

        let outcome = decode_flate_png_legacy(&raw, &gray(3));
        assert!(outcome.data.is_none());
        assert!(matches!(outcome.error, Some(Error::Decompression(_))));
    }

    #[test]
    fn test_outcome_conversions() {
        let partial = DecodeOutcome::partial(
            vec![1, 2],
            Error::StreamLengthMismatch {
                len: 3,
                row_len: 2,
                rows: 1,
            },
        );
        assert!(!partial.is_ok());
        assert_eq!(partial.clone().into_best_effort().unwrap(), vec![1, 2]);
        assert!(partial.into_result().is_err());

        let failed = DecodeOutcome::failed(Error::UnsupportedBitDepth(4));
        assert!(failed.clone().into_best_effort().is_err());
        assert!(failed.into_result().is_err());
    }

    #[test]
    fn test_predictor_decoder_modes() {
        let data = [0, 1, 2, 3, 9]; // trailing partial row
        let lenient = PngPredictorDecoder::new(gray(3), DecodeOptions::lenient());
        assert_eq!(lenient.decode(&data).unwrap(), vec![1, 2, 3]);
        assert_eq!(lenient.name(), "PNGPredictor");

        let strict = PngPredictorDecoder::new(gray(3), DecodeOptions::strict());
        assert!(strict.decode(&data).is_err());
    }

    #[test]
    fn test_decode_stream_no_filters() {
        let data = b"Hello, World!";
        let result = decode_stream_with_options(data, &[], None, &DecodeOptions::default());
        assert_eq!(result.unwrap(), data);
    }

    #[test]
    fn test_decode_stream_unsupported_filter() {
        let filters = vec!["LZWDecode".to_string()];
        let result = decode_stream_with_options(b"test", &filters, None, &DecodeOptions::default());
        match result {
            Err(Error::UnsupportedFilter(name)) => assert_eq!(name, "LZWDecode"),
            other => panic!("Expected UnsupportedFilter error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_stream_flate_with_predictor() {
        let compressed = zlib(&[2, 10, 20, 30, 2, 1, 1, 1]);
        let filters = vec!["FlateDecode".to_string()];
        let result =
            decode_stream_with_options(&compressed, &filters, Some(&gray(3)), &DecodeOptions::strict());
        assert_eq!(result.unwrap(), vec![10, 20, 30, 11, 21, 31]);
    }
}
