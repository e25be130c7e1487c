//! Content based detection of embedded image formats

use derive_more::derive::Display;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Image encodings that can be recognised from their leading bytes
///
/// The display form is the file extension used when extracting.
#[derive(Display, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "lowercase"))]
pub enum ImageKind {
    #[display("jpeg")]
    Jpeg,
    #[display("png")]
    Png,
    #[display("gif")]
    Gif,
    /// JPEG XR / HD Photo
    #[display("wdp")]
    Wdp,
    /// SGI image
    #[display("rgb")]
    Rgb,
    #[display("pbm")]
    Pbm,
    #[display("pgm")]
    Pgm,
    #[display("ppm")]
    Ppm,
    /// Sun raster
    #[display("rast")]
    Rast,
    #[display("xbm")]
    Xbm,
    #[display("bmp")]
    Bmp,
    #[display("webp")]
    Webp,
    /// OpenEXR
    #[display("exr")]
    Exr,
}

/// Extension used for payloads that are not recognised
pub const FALLBACK_EXTENSION: &str = "dat";

/// Only this many leading bytes take part in signature matching
const SIGNATURE_WINDOW: usize = 32;

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];

type Test = fn(&[u8]) -> bool;

// JPEG XR shares the TIFF byte order marks, and every TIFF seen in these containers is
// actually JPEG XR, so a TIFF match is reported as wdp.
static SIGNATURES: &[(ImageKind, Test)] = &[
    (ImageKind::Jpeg, is_jpeg),
    (ImageKind::Png, is_png),
    (ImageKind::Gif, is_gif),
    (ImageKind::Wdp, is_tiff),
    (ImageKind::Rgb, is_rgb),
    (ImageKind::Pbm, is_pbm),
    (ImageKind::Pgm, is_pgm),
    (ImageKind::Ppm, is_ppm),
    (ImageKind::Rast, is_rast),
    (ImageKind::Xbm, is_xbm),
    (ImageKind::Bmp, is_bmp),
    (ImageKind::Webp, is_webp),
    (ImageKind::Exr, is_exr),
];

fn is_jpeg(h: &[u8]) -> bool {
    matches!(h.get(6..10), Some(b"JFIF" | b"Exif")) || h.starts_with(b"\xFF\xD8\xFF\xDB")
}

fn is_png(h: &[u8]) -> bool {
    h.starts_with(b"\x89PNG\r\n\x1a\n")
}

fn is_gif(h: &[u8]) -> bool {
    matches!(h.get(..6), Some(b"GIF87a" | b"GIF89a"))
}

fn is_tiff(h: &[u8]) -> bool {
    matches!(h.get(..2), Some(b"MM" | b"II"))
}

fn is_rgb(h: &[u8]) -> bool {
    h.starts_with(b"\x01\xda")
}

fn is_pbm(h: &[u8]) -> bool {
    netpbm(h, b"14")
}

fn is_pgm(h: &[u8]) -> bool {
    netpbm(h, b"25")
}

fn is_ppm(h: &[u8]) -> bool {
    netpbm(h, b"36")
}

fn netpbm(h: &[u8], variants: &[u8]) -> bool {
    matches!(h, [b'P', variant, sep, ..] if variants.contains(variant) && b" \t\n\r".contains(sep))
}

fn is_rast(h: &[u8]) -> bool {
    h.starts_with(b"\x59\xA6\x6A\x95")
}

fn is_xbm(h: &[u8]) -> bool {
    h.starts_with(b"#define ")
}

fn is_bmp(h: &[u8]) -> bool {
    h.starts_with(b"BM")
}

fn is_webp(h: &[u8]) -> bool {
    h.starts_with(b"RIFF") && h.get(8..12) == Some(b"WEBP".as_slice())
}

fn is_exr(h: &[u8]) -> bool {
    h.starts_with(b"\x76\x2f\x31\x01")
}

/// Detect the image encoding of a buffer
///
/// Signatures are checked first. A buffer that matches none of them but starts with a JPEG
/// start-of-image marker and, ignoring trailing zero padding, ends with an end-of-image marker is
/// still treated as a bare JPEG stream.
pub fn sniff(data: &[u8]) -> Option<ImageKind> {
    let window = &data[..data.len().min(SIGNATURE_WINDOW)];
    SIGNATURES
        .iter()
        .find(|(_, test)| test(window))
        .map(|&(kind, _)| kind)
        .or_else(|| is_bare_jpeg(data).then_some(ImageKind::Jpeg))
}

fn is_bare_jpeg(data: &[u8]) -> bool {
    if !data.starts_with(&JPEG_SOI) {
        return false;
    }
    let end = data.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    data[..end].ends_with(&JPEG_EOI)
}
