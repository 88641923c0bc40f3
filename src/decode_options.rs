/// Decode options for choosing between the strict and lenient decoding paths.
///
/// The lenient path recovers from truncated rows and unknown filter tags and
/// tries several inflate strategies. The strict path reproduces the legacy
/// decoder: plain zlib only, and any anomaly fails the whole stream.
///
/// # Example
///
/// ```
/// use flate_png::decode_options::DecodeOptions;
///
/// // Legacy behavior - fail on the first anomaly
/// let strict = DecodeOptions::strict();
///
/// // Robust behavior (default) - recover what the input allows
/// let lenient = DecodeOptions::lenient();
///
/// // Reject streams that inflate more than 500:1
/// let guarded = DecodeOptions::lenient().with_ratio_limit(500);
///
/// // Custom configuration
/// let custom = DecodeOptions {
///     strict: false,
///     max_decompression_ratio: 0,
///     max_decompressed_size: 16 * 1024 * 1024,
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Fail on the first anomaly (true) or recover partial output (false)
    pub strict: bool,

    /// Maximum decompression ratio (decompressed:compressed)
    ///
    /// Default: 0 (disabled). Enable with [`DecodeOptions::with_ratio_limit`].
    pub max_decompression_ratio: u32,

    /// Maximum decompressed stream size in bytes
    ///
    /// Default: 100 MB. Set to 0 to disable check.
    pub max_decompressed_size: usize,
}

impl Default for DecodeOptions {
    /// Default configuration: lenient mode
    fn default() -> Self {
        Self::lenient()
    }
}

impl DecodeOptions {
    /// Strict mode: the legacy decoder
    pub fn strict() -> Self {
        Self {
            strict: true,
            max_decompression_ratio: 0,
            max_decompressed_size: 100 * 1024 * 1024, // 100 MB
        }
    }

    /// Lenient mode: the robust decoder
    ///
    /// Truncated streams yield their complete rows and unknown filter tags are
    /// decoded as unfiltered rows.
    pub fn lenient() -> Self {
        Self {
            strict: false,
            max_decompression_ratio: 0,
            max_decompressed_size: 100 * 1024 * 1024, // 100 MB
        }
    }

    /// Reject streams whose decompressed:compressed ratio exceeds `ratio`.
    pub fn with_ratio_limit(mut self, ratio: u32) -> Self {
        self.max_decompression_ratio = ratio;
        self
    }

    /// Disable decompression bomb protection.
    pub fn without_limits(mut self) -> Self {
        self.max_decompression_ratio = 0;
        self.max_decompressed_size = 0;
        self
    }
}
