// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::needless_range_loop)]

//! # flate_png
//!
//! FlateDecode with PNG predictor reconstruction for PDF streams.
//!
//! Cross-reference streams, object streams and image XObjects are frequently
//! stored as zlib data whose rows were run through a PNG filter first
//! (`/Predictor 10`-`15` in `/DecodeParms`). This crate inflates such streams
//! and reverses the per-row None, Sub, Up, Average and Paeth filters.
//!
//! ## Robust and legacy decoding
//!
//! - [`decode_flate_png`] recovers what it can: truncated trailing rows are
//!   dropped and reported, unknown filter tags decode as unfiltered rows, and
//!   damaged zlib data is retried with several inflate implementations and
//!   the recovery is reported alongside the rows.
//! - [`decode_flate_png_legacy`] keeps the historical strict behavior: plain
//!   zlib, None/Sub/Up rows only, and any anomaly fails the whole stream.
//!
//! Both return a [`DecodeOutcome`], carrying the reconstructed bytes and the
//! error side by side so callers decide what to surface.
//!
//! ## Quick Start
//!
//! ```rust
//! use flate2::write::ZlibEncoder;
//! use flate2::Compression;
//! use flate_png::{decode_flate_png, DecodeParams};
//! use std::io::Write;
//!
//! // /Predictor 12 /Columns 5 from a cross-reference stream: two Up rows
//! let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
//! encoder.write_all(&[2, 1, 0, 16, 0, 0, 2, 0, 0, 1, 0, 0]).unwrap();
//! let stream_bytes = encoder.finish().unwrap();
//!
//! let params = DecodeParams::png(12, 5, 1, 8);
//! let outcome = decode_flate_png(&stream_bytes, &params);
//! match &outcome.error {
//!     None => println!("{} bytes", outcome.data.as_ref().map_or(0, Vec::len)),
//!     Some(e) if outcome.data.is_some() => println!("recovered from: {}", e),
//!     Some(e) => eprintln!("failed: {}", e),
//! }
//! assert_eq!(outcome.data, Some(vec![1, 0, 16, 0, 0, 1, 0, 17, 0, 0]));
//! ```
//!
//! Only 8- and 16-bit components are supported; sub-byte depths are rejected
//! with [`Error::UnsupportedBitDepth`].
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Error handling
pub mod error;

/// Decode configuration options
pub mod decode_options;

// Stream decoders
pub mod decoders;

// Re-exports
pub use decode_options::DecodeOptions;
pub use decoders::{
    decode_flate_png, decode_flate_png_legacy, decode_flate_png_with_options, unfilter_png,
    DecodeOutcome, DecodeParams, PngFilter, RowGeometry,
};
pub use error::{Error, Result};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
