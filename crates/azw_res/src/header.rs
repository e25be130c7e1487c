//! The CONT header stored at the start of section 0

use std::{fmt, io::Cursor};

use binrw::{BinRead, BinWrite};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    codec::TextCodec,
    error::{Error, Result},
    exth::{self, MetadataRecord},
};

/// Size of the fixed part of the header, the EXTH region starts right after it
pub const HEADER_LEN: usize = 48;

/// CONT header
///
/// All data is stored in big endian format.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(big)]
pub struct ContainerHeader {
    /// Always `CONT` for the header section
    pub magic: [u8; 4],

    /// Length of the fixed header
    pub record_size: u32,

    pub record_type: u16,

    pub count: u16,

    /// Selects the [`TextCodec`] of the title and string metadata
    pub codepage: u32,

    pub unknown0: u32,

    pub unknown1: u32,

    /// Number of resource sections
    pub num_resc_recs: u32,

    /// Number of resource sections, not counting placeholders
    pub num_wo_placeholders: u32,

    pub offset_to_hrefs: u32,

    pub unknown2: u32,

    /// Offset of the title from the start of the section
    pub title_offset: u32,

    /// Length of the title in bytes
    pub title_length: u32,
}

/// Value of a single header field
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(untagged))]
pub enum FieldValue {
    Text(String),
    Number(u32),
}

/// Named header field along with its location, for reporting
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct HeaderField {
    pub name: &'static str,
    pub offset: usize,
    pub width: usize,
    pub value: FieldValue,
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Field: {:20}   Offset: 0x{:3x}   Width:  {}   Value: ",
            self.name, self.offset, self.width
        )?;
        match &self.value {
            FieldValue::Text(text) => write!(f, "{text}"),
            FieldValue::Number(value) => write!(f, "0x{value:0width$x}", width = self.width),
        }
    }
}

impl ContainerHeader {
    /// Every field in offset order
    pub fn fields(&self) -> Vec<HeaderField> {
        let field = |name, offset, width, value| HeaderField {
            name,
            offset,
            width,
            value: FieldValue::Number(value),
        };

        vec![
            HeaderField {
                name: "magic",
                offset: 0x00,
                width: 4,
                value: FieldValue::Text(String::from_utf8_lossy(&self.magic).into_owned()),
            },
            field("record_size", 0x04, 4, self.record_size),
            field("type", 0x08, 2, self.record_type as u32),
            field("count", 0x0A, 2, self.count as u32),
            field("codepage", 0x0C, 4, self.codepage),
            field("unknown0", 0x10, 4, self.unknown0),
            field("unknown1", 0x14, 4, self.unknown1),
            field("num_resc_recs", 0x18, 4, self.num_resc_recs),
            field("num_wo_placeholders", 0x1C, 4, self.num_wo_placeholders),
            field("offset_to_hrefs", 0x20, 4, self.offset_to_hrefs),
            field("unknown2", 0x24, 4, self.unknown2),
            field("title_offset", 0x28, 4, self.title_offset),
            field("title_length", 0x2C, 4, self.title_length),
        ]
    }

    pub fn codec(&self) -> TextCodec {
        TextCodec::from_codepage(self.codepage)
    }
}

/// Section 0 split into its fixed header, title and EXTH region
#[derive(Debug, Clone)]
pub struct HeaderSection<'a> {
    header: ContainerHeader,
    title: String,
    exth: &'a [u8],
}

impl<'a> HeaderSection<'a> {
    /// Decode the header of a section, which is expected to be section 0
    pub fn parse(section: &'a [u8]) -> Result<HeaderSection<'a>> {
        if section.len() < HEADER_LEN {
            return Err(Error::TruncatedHeader { len: section.len() });
        }

        let header = ContainerHeader::read(&mut Cursor::new(&section[..HEADER_LEN]))?;

        let title_range = (header.title_offset as usize)
            .checked_add(header.title_length as usize)
            .filter(|&end| end <= section.len())
            .map(|end| header.title_offset as usize..end)
            .ok_or(Error::TitleOutOfBounds {
                offset: header.title_offset,
                length: header.title_length,
                len: section.len(),
            })?;

        let title = header.codec().decode(&section[title_range]).into_owned();
        debug!(codec = %header.codec(), title = %title, "parsed container header");

        Ok(HeaderSection {
            header,
            title,
            exth: &section[HEADER_LEN..],
        })
    }

    /// The fixed 48 byte header
    pub fn header(&self) -> &ContainerHeader {
        &self.header
    }

    /// Codec selected by the header codepage
    pub fn codec(&self) -> TextCodec {
        self.header.codec()
    }

    /// Decoded title, lossy when the bytes are malformed for the codec
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Raw EXTH region, everything in the section after the fixed header
    pub fn exth(&self) -> &'a [u8] {
        self.exth
    }

    /// Decode the records of the EXTH region
    pub fn metadata(&self) -> Result<Vec<MetadataRecord>> {
        exth::decode(self.exth, self.codec())
    }
}
