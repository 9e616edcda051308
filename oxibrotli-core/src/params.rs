//! Encoder settings.

use crate::error::{OxiBrotliError, Result};

/// Compression mode hint passed to the encoder.
///
/// The discriminant values match the codec's own mode constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Default mode; the compressor assumes nothing about the input.
    #[default]
    Generic,
    /// Mode for UTF-8 formatted text input.
    Text,
    /// Mode used for WOFF 2.0 fonts.
    Font,
}

/// Encoder settings: quality, LZ window size, and mode.
///
/// Setters validate their range at configuration time; an out-of-range value
/// is rejected immediately instead of surfacing later at encode time.
///
/// ```rust
/// use oxibrotli_core::params::{Mode, Parameters};
///
/// let params = Parameters::default()
///     .with_quality(4)
///     .unwrap()
///     .with_window(22)
///     .unwrap()
///     .with_mode(Mode::Text);
/// assert_eq!(params.quality(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameters {
    quality: i32,
    lgwin: i32,
    mode: Mode,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            quality: -1,
            lgwin: -1,
            mode: Mode::Generic,
        }
    }
}

impl Parameters {
    /// Set the compression quality, `0..=11`, or `-1` for the codec default.
    pub fn with_quality(mut self, quality: i32) -> Result<Self> {
        if !(-1..=11).contains(&quality) {
            return Err(OxiBrotliError::invalid_argument(
                "quality should be in range [0, 11], or -1",
            ));
        }
        self.quality = quality;
        Ok(self)
    }

    /// Set log2 of the LZ window size, `10..=24`, or `-1` for the codec
    /// default.
    pub fn with_window(mut self, lgwin: i32) -> Result<Self> {
        if lgwin != -1 && !(10..=24).contains(&lgwin) {
            return Err(OxiBrotliError::invalid_argument(
                "lgwin should be in range [10, 24], or -1",
            ));
        }
        self.lgwin = lgwin;
        Ok(self)
    }

    /// Set the compression mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Configured quality, `-1` meaning codec default.
    pub fn quality(&self) -> i32 {
        self.quality
    }

    /// Configured log2 window size, `-1` meaning codec default.
    pub fn lgwin(&self) -> i32 {
        self.lgwin
    }

    /// Configured compression mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = Parameters::default();
        assert_eq!(params.quality(), -1);
        assert_eq!(params.lgwin(), -1);
        assert_eq!(params.mode(), Mode::Generic);
    }

    #[test]
    fn test_quality_range() {
        assert!(Parameters::default().with_quality(0).is_ok());
        assert!(Parameters::default().with_quality(11).is_ok());
        assert!(Parameters::default().with_quality(-1).is_ok());
        assert!(Parameters::default().with_quality(12).is_err());
        assert!(Parameters::default().with_quality(-2).is_err());
    }

    #[test]
    fn test_window_range() {
        assert!(Parameters::default().with_window(10).is_ok());
        assert!(Parameters::default().with_window(24).is_ok());
        assert!(Parameters::default().with_window(-1).is_ok());
        assert!(Parameters::default().with_window(9).is_err());
        assert!(Parameters::default().with_window(25).is_err());
    }
}
