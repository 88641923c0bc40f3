//! PNG predictor reconstruction for Flate-compressed streams.
//!
//! Streams using predictors 10-15 store each scanline as one filter tag byte
//! followed by `stride` filtered bytes. The tag selects the PNG filter used for
//! that row, independently of the predictor code, which only says "PNG family".
//! Decoding reverses the filter row by row using the previous reconstructed row
//! as context.

use crate::error::{Error, Result};

/// PNG filter types, as stored in each scanline's tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngFilter {
    /// No filtering (tag 0)
    None = 0,
    /// Sub: each byte is the difference from the byte one pixel to its left (tag 1)
    Sub = 1,
    /// Up: each byte is the difference from the byte above (tag 2)
    Up = 2,
    /// Average: difference from the floor average of left and above (tag 3)
    Average = 3,
    /// Paeth: difference from the Paeth predictor of left, above and above-left (tag 4)
    Paeth = 4,
}

impl PngFilter {
    /// Map a scanline tag byte to its filter, `None` for bytes outside 0-4.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(PngFilter::None),
            1 => Some(PngFilter::Sub),
            2 => Some(PngFilter::Up),
            3 => Some(PngFilter::Average),
            4 => Some(PngFilter::Paeth),
            _ => None,
        }
    }

    /// Filters understood by the legacy decoder.
    pub fn is_legacy(self) -> bool {
        matches!(self, PngFilter::None | PngFilter::Sub | PngFilter::Up)
    }
}

/// Decode parameters for the predictor stage (the stream's /DecodeParms).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeParams {
    /// Predictor algorithm (1 = none, 2 = TIFF, 10-15 = PNG)
    pub predictor: i64,
    /// Number of columns (width in samples)
    pub columns: usize,
    /// Number of color components per sample (default 1)
    pub colors: usize,
    /// Bits per component (default 8)
    pub bits_per_component: usize,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            predictor: 1, // No prediction
            columns: 1,
            colors: 1,
            bits_per_component: 8,
        }
    }
}

impl DecodeParams {
    /// Parameters for a PNG-predicted stream.
    pub fn png(predictor: i64, columns: usize, colors: usize, bits_per_component: usize) -> Self {
        Self {
            predictor,
            columns,
            colors,
            bits_per_component,
        }
    }

    /// Whether the predictor code selects the PNG family (10-15).
    pub fn is_png(&self) -> bool {
        (10..=15).contains(&self.predictor)
    }

    /// Row geometry for these parameters.
    pub fn geometry(&self) -> Result<RowGeometry> {
        RowGeometry::new(self.columns, self.colors, self.bits_per_component)
    }
}

/// Per-stream scanline layout derived from the decode parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowGeometry {
    /// Bytes occupied by one pixel, the distance to the "left" neighbor
    pub bytes_per_pixel: usize,
    /// Payload bytes per row, excluding the filter tag
    pub stride: usize,
}

impl RowGeometry {
    /// Compute the geometry, rejecting sub-byte depths.
    pub fn new(columns: usize, colors: usize, bits_per_component: usize) -> Result<Self> {
        if bits_per_component == 0 || !bits_per_component.is_multiple_of(8) {
            return Err(Error::UnsupportedBitDepth(bits_per_component));
        }
        if columns == 0 || colors == 0 {
            return Err(Error::InvalidDecodeParams(format!(
                "columns ({}) and colors ({}) must be positive",
                columns, colors
            )));
        }

        let bytes_per_pixel = (colors * bits_per_component).div_ceil(8);
        Ok(Self {
            bytes_per_pixel,
            stride: bytes_per_pixel * columns,
        })
    }

    /// Size of one scanline including its filter tag.
    pub fn row_len(&self) -> usize {
        self.stride + 1
    }
}

/// Paeth predictor function from PNG specification.
#[inline]
pub fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let a = a as i16;
    let b = b as i16;
    let c = c as i16;

    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();

    if pa <= pb && pa <= pc {
        a as u8
    } else if pb <= pc {
        b as u8
    } else {
        c as u8
    }
}

/// Reverse one filtered scanline in place.
///
/// `row` holds the filtered payload (tag already stripped) and is overwritten
/// with the reconstructed bytes. `prev` is the previous reconstructed row, all
/// zeros for the first row, and must be at least as long as `row`.
pub fn unfilter_row(filter: PngFilter, row: &mut [u8], prev: &[u8], bpp: usize) {
    debug_assert!(prev.len() >= row.len());
    let len = row.len();
    let lead = bpp.min(len);

    match filter {
        PngFilter::None => {},
        PngFilter::Sub => {
            for x in bpp..len {
                row[x] = row[x].wrapping_add(row[x - bpp]);
            }
        },
        PngFilter::Up => {
            for (byte, &up) in row.iter_mut().zip(prev) {
                *byte = byte.wrapping_add(up);
            }
        },
        PngFilter::Average => {
            // No left neighbor for the first pixel
            for x in 0..lead {
                row[x] = row[x].wrapping_add(prev[x] / 2);
            }
            for x in lead..len {
                let avg = ((row[x - bpp] as u16 + prev[x] as u16) / 2) as u8;
                row[x] = row[x].wrapping_add(avg);
            }
        },
        PngFilter::Paeth => {
            // With a = c = 0 the predictor always picks b
            for x in 0..lead {
                row[x] = row[x].wrapping_add(prev[x]);
            }
            for x in lead..len {
                let predicted = paeth_predictor(row[x - bpp], prev[x], prev[x - bpp]);
                row[x] = row[x].wrapping_add(predicted);
            }
        },
    }
}

/// Reconstruct a run of complete scanlines.
///
/// `data.len()` must be a multiple of `geometry.row_len()`; the orchestrator
/// trims incomplete trailing rows before calling this.
///
/// In lenient mode an unknown tag is decoded as [`PngFilter::None`]. In strict
/// mode it fails with [`Error::InvalidFilterTag`], and Average/Paeth rows fail
/// with [`Error::UnsupportedFilterTag`] since the legacy decoder never had them.
pub fn reconstruct(data: &[u8], geometry: RowGeometry, strict: bool) -> Result<Vec<u8>> {
    let row_len = geometry.row_len();
    let bpp = geometry.bytes_per_pixel;
    debug_assert!(data.len().is_multiple_of(row_len));

    let row_count = data.len() / row_len;
    let mut output = Vec::with_capacity(row_count * geometry.stride);
    let mut prev = vec![0u8; geometry.stride];
    let mut current = vec![0u8; geometry.stride];

    for (row_idx, scanline) in data.chunks_exact(row_len).enumerate() {
        let tag = scanline[0];
        let filter = match PngFilter::from_tag(tag) {
            Some(filter) if strict && !filter.is_legacy() => {
                return Err(Error::UnsupportedFilterTag { row: row_idx, tag });
            },
            Some(filter) => filter,
            None if strict => {
                return Err(Error::InvalidFilterTag { row: row_idx, tag });
            },
            None => {
                log::warn!(
                    "Invalid PNG filter tag {} in row {}, decoding row as unfiltered",
                    tag,
                    row_idx
                );
                PngFilter::None
            },
        };

        current.copy_from_slice(&scanline[1..]);
        unfilter_row(filter, &mut current, &prev, bpp);
        output.extend_from_slice(&current);
        std::mem::swap(&mut prev, &mut current);
    }

    Ok(output)
}
