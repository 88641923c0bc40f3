//! FlateDecode (zlib/deflate) implementation.
//!
//! Inflates the compressed payload ahead of predictor reconstruction. Uses the
//! flate2 crate for zlib, with `inflate` and `libflate` as fallbacks when the
//! stream is damaged.

use crate::decoders::StreamDecoder;
use crate::error::{Error, Result};
use flate2::read::{DeflateDecoder, ZlibDecoder};
use inflate::inflate_bytes_zlib;
use libflate::zlib::Decoder as LibflateDecoder;
use std::io::Read;

/// FlateDecode filter implementation.
///
/// The default decoder keeps whatever output a damaged stream yields and falls
/// back through several inflate implementations. [`FlateDecoder::strict`]
/// accepts only a well-formed zlib stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlateDecoder {
    strict: bool,
}

impl FlateDecoder {
    /// Recovering decoder.
    pub fn new() -> Self {
        Self { strict: false }
    }

    /// Zlib-only decoder that fails on any corruption.
    pub fn strict() -> Self {
        Self { strict: true }
    }

    fn decode_strict(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(input);
        let mut output = Vec::new();
        decoder.read_to_end(&mut output).map_err(|e| {
            Error::Decompression(format!(
                "zlib error: {}. Compressed size: {} bytes.",
                e,
                input.len()
            ))
        })?;
        Ok(output)
    }

    /// Inflate `input`, reporting whether a fallback had to supply the bytes.
    ///
    /// Only a clean zlib read yields `recovered: None`. Output from a partial
    /// read or from any fallback strategy is kept but marked with a
    /// [`Error::Decompression`].
    pub fn inflate(&self, input: &[u8]) -> Result<Inflated> {
        if self.strict {
            return self.decode_strict(input).map(Inflated::clean);
        }
        self.decode_recovering(input)
    }

    fn decode_recovering(&self, input: &[u8]) -> Result<Inflated> {
        let mut decoder = ZlibDecoder::new(input);
        let mut output = Vec::new();

        let zlib_err = match decoder.read_to_end(&mut output) {
            Ok(_) => return Ok(Inflated::clean(output)),
            Err(e) => e,
        };

        // Partial recovery: if we got ANY data before the error, use it
        if !output.is_empty() {
            log::warn!(
                "FlateDecode partial recovery: extracted {} bytes before corruption: {}",
                output.len(),
                zlib_err
            );
            return Ok(Inflated::recovered(output, "partial zlib", &zlib_err));
        }

        // Some writers emit raw deflate without the zlib wrapper
        log::info!("Zlib decode failed, trying raw deflate");
        if let Some(data) = read_deflate(input, "Raw deflate") {
            return Ok(Inflated::recovered(data, "raw deflate", &zlib_err));
        }

        if input.len() > 2 {
            log::info!("Trying deflate after skipping potential corrupt zlib header");
            if let Some(data) = read_deflate(&input[2..], "Deflate with header skip") {
                return Ok(Inflated::recovered(data, "deflate with header skip", &zlib_err));
            }
        }

        log::info!("Trying inflate crate with zlib");
        match inflate_bytes_zlib(input) {
            Ok(data) if !data.is_empty() => {
                log::info!("Inflate crate recovery succeeded: {} bytes", data.len());
                return Ok(Inflated::recovered(data, "inflate crate", &zlib_err));
            },
            Ok(_) => log::info!("Inflate crate produced no data"),
            Err(inflate_err) => log::info!("Inflate crate failed: {}", inflate_err),
        }

        log::info!("Trying libflate crate");
        output.clear();
        match LibflateDecoder::new(input) {
            Ok(mut libflate_decoder) => match libflate_decoder.read_to_end(&mut output) {
                Ok(_) if !output.is_empty() => {
                    log::info!("Libflate recovery succeeded: {} bytes", output.len());
                    return Ok(Inflated::recovered(output, "libflate", &zlib_err));
                },
                Err(_) if !output.is_empty() => {
                    log::warn!("Libflate partial recovery: {} bytes", output.len());
                    return Ok(Inflated::recovered(output, "partial libflate", &zlib_err));
                },
                _ => log::info!("Libflate read failed"),
            },
            Err(e) => log::info!("Libflate init failed: {}", e),
        }

        // CM nibble of the first header byte must be 8 (deflate)
        if input.len() >= 2 && input[0] & 0x0F != 8 {
            log::info!(
                "Detected invalid compression method {} in header byte 0x{:02x}, trying with corrected header",
                input[0] & 0x0F,
                input[0]
            );
            let mut corrected = input.to_vec();
            corrected[0] = (input[0] & 0xF0) | 0x08;

            output.clear();
            let mut decoder = ZlibDecoder::new(&corrected[..]);
            match decoder.read_to_end(&mut output) {
                Ok(_) if !output.is_empty() => {
                    log::info!("Header correction recovery succeeded: {} bytes", output.len());
                    return Ok(Inflated::recovered(output, "corrected zlib header", &zlib_err));
                },
                Err(_) if !output.is_empty() => {
                    log::warn!("Header correction partial recovery: {} bytes", output.len());
                    return Ok(Inflated::recovered(
                        output,
                        "partial corrected zlib header",
                        &zlib_err,
                    ));
                },
                _ => log::info!("Header correction failed"),
            }
        }

        log::error!("All FlateDecode recovery strategies failed. Zlib: {}", zlib_err);

        Err(Error::Decompression(format!(
            "all decompression attempts failed. Zlib error: {}. Compressed size: {} bytes.",
            zlib_err,
            input.len()
        )))
    }
}

/// Inflated bytes, with a note when they did not come from a clean zlib read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inflated {
    /// Decompressed bytes
    pub data: Vec<u8>,
    /// Set when a fallback strategy or a partial read produced `data`
    pub recovered: Option<Error>,
}

impl Inflated {
    fn clean(data: Vec<u8>) -> Self {
        Self {
            data,
            recovered: None,
        }
    }

    fn recovered(data: Vec<u8>, strategy: &str, zlib_err: &std::io::Error) -> Self {
        Self {
            recovered: Some(Error::Decompression(format!(
                "zlib error: {}. Recovered {} bytes via {}.",
                zlib_err,
                data.len(),
                strategy
            ))),
            data,
        }
    }
}

/// Run a raw deflate decoder, keeping partial output.
fn read_deflate(input: &[u8], strategy: &str) -> Option<Vec<u8>> {
    let mut output = Vec::new();
    let mut decoder = DeflateDecoder::new(input);

    match decoder.read_to_end(&mut output) {
        Ok(_) if !output.is_empty() => {
            log::info!("{} recovery succeeded: {} bytes", strategy, output.len());
            Some(output)
        },
        Err(_) if !output.is_empty() => {
            log::warn!("{} partial recovery: {} bytes", strategy, output.len());
            Some(output)
        },
        _ => None,
    }
}

impl StreamDecoder for FlateDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.inflate(input).map(|inflated| inflated.data)
    }

    fn name(&self) -> &str {
        "FlateDecode"
    }
}
