//! Text codecs selected by the header codepage

use std::borrow::Cow;

use derive_more::derive::Display;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use tracing::warn;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Text decoding scheme used for titles and string metadata
#[derive(Display, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum TextCodec {
    /// Codepage 1252, also used for any codepage not listed
    #[default]
    #[display("windows-1252")]
    #[cfg_attr(feature = "serde", serde(rename = "windows-1252"))]
    Windows1252,

    /// Codepage 65001
    #[display("utf-8")]
    #[cfg_attr(feature = "serde", serde(rename = "utf-8"))]
    Utf8,
}

impl TextCodec {
    /// Pick the codec for a header codepage, falling back to windows-1252
    pub fn from_codepage(codepage: u32) -> TextCodec {
        match codepage {
            1252 => TextCodec::Windows1252,
            65001 => TextCodec::Utf8,
            _ => TextCodec::default(),
        }
    }

    pub fn encoding(&self) -> &'static Encoding {
        match self {
            TextCodec::Windows1252 => WINDOWS_1252,
            TextCodec::Utf8 => UTF_8,
        }
    }

    /// Decode bytes, replacing malformed sequences with U+FFFD
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        let (text, had_errors) = self.encoding().decode_without_bom_handling(bytes);
        if had_errors {
            warn!(codec = %self, "malformed text replaced while decoding");
        }
        text
    }
}
