//! Error types that can be emitted from this library

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// file is not an azw.res container
    #[error("invalid file format: expected RBINCONT signature, found {found:?}")]
    #[diagnostic(help("only Kindle HD image containers (.azw.res) are supported"))]
    InvalidSignature {
        /// Type and creator bytes found at offset 0x3C, lossily decoded
        found: String,
    },

    /// file is too short to hold the palm database prologue
    #[error("file is too short for a palm database prologue ({len} bytes)")]
    TruncatedPrologue {
        /// Length of the file
        len: usize,
    },

    /// requested section does not exist
    #[error("section {index} is out of range, database holds {count} sections")]
    SectionOutOfRange {
        /// Requested index
        index: usize,
        /// Number of sections in the database
        count: usize,
    },

    /// section offsets point outside of the file or go backwards
    #[error("section {index} spans {start:#x}..{end:#x} which is invalid for a {len} byte file")]
    InvalidSectionBounds {
        /// Section index
        index: usize,
        /// Start offset from the record table
        start: usize,
        /// Computed end offset
        end: usize,
        /// Length of the file
        len: usize,
    },

    /// section 0 is shorter than the fixed CONT header
    #[error("container header is truncated ({len} bytes, need 48)")]
    TruncatedHeader {
        /// Length of the section
        len: usize,
    },

    /// title slice is outside of section 0
    #[error("title at {offset:#x} with length {length} is outside of the {len} byte header section")]
    TitleOutOfBounds {
        /// Title offset from the header
        offset: u32,
        /// Title length from the header
        length: u32,
        /// Length of the section
        len: usize,
    },

    /// EXTH record would read past the end of the blob
    #[error("metadata record {index} at offset {offset:#x} runs past the end of the EXTH region")]
    TruncatedRecord {
        /// Position of the record in the stream
        index: u32,
        /// Offset of the record within the blob
        offset: usize,
    },

    /// refusing to replace an existing image
    #[error("{} already exists", .0.display())]
    #[diagnostic(help("drop --no-clobber to replace existing images"))]
    OutputExists(PathBuf),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
