//! Decoding of the EXTH metadata records trailing the container header
//!
//! The region starts with a 12 byte preamble (4 byte identifier, 4 byte length, 4 byte record
//! count) followed by the records themselves. Each record is a big endian tag, a big endian total
//! size that includes the 8 byte record header, and the payload.

use std::{borrow::Cow, fmt};

use byteorder::{BigEndian, ByteOrder};
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    codec::TextCodec,
    error::{Error, Result},
};

/// Size of the preamble in front of the first record
pub const PREAMBLE_LEN: usize = 12;

/// Size of the tag and size fields of every record
pub const RECORD_HEADER_LEN: usize = 8;

/// Tags whose payload is text in the container codec
pub static STRING_TAGS: &[(u32, &str)] = &[
    (1, "Drm Server Id (1)"),
    (2, "Drm Commerce Id (2)"),
    (3, "Drm Ebookbase Book Id(3)"),
    (100, "Creator_(100)"),
    (101, "Publisher_(101)"),
    (102, "Imprint_(102)"),
    (103, "Description_(103)"),
    (104, "ISBN_(104)"),
    (105, "Subject_(105)"),
    (106, "Published_(106)"),
    (107, "Review_(107)"),
    (108, "Contributor_(108)"),
    (109, "Rights_(109)"),
    (110, "SubjectCode_(110)"),
    (111, "Type_(111)"),
    (112, "Source_(112)"),
    (113, "ASIN_(113)"),
    (114, "versionNumber_(114)"),
    (117, "Adult_(117)"),
    (118, "Price_(118)"),
    (119, "Currency_(119)"),
    (122, "fixed-layout_(122)"),
    (123, "book-type_(123)"),
    (124, "orientation-lock_(124)"),
    (126, "original-resolution_(126)"),
    (127, "zero-gutter_(127)"),
    (128, "zero-margin_(128)"),
    (129, "K8_Masthead/Cover_Image_(129)"),
    (132, "RegionMagnification_(132)"),
    (200, "DictShortName_(200)"),
    (208, "Watermark_(208)"),
    (501, "cdeType_(501)"),
    (502, "last_update_time_(502)"),
    (503, "Updated_Title_(503)"),
    (504, "ASIN_(504)"),
    (508, "Unknown_Title_Furigana?_(508)"),
    (517, "Unknown_Creator_Furigana?_(517)"),
    (522, "Unknown_Publisher_Furigana?_(522)"),
    (524, "Language_(524)"),
    (525, "primary-writing-mode_(525)"),
    (526, "Unknown_(526)"),
    (527, "page-progression-direction_(527)"),
    (528, "override-kindle_fonts_(528)"),
    (529, "Unknown_(529)"),
    (534, "Input_Source_Type_(534)"),
    (535, "Kindlegen_BuildRev_Number_(535)"),
    // CONT header is 0, ends with CONTAINER_BOUNDARY
    (536, "Container_Info_(536)"),
    (538, "Container_Resolution_(538)"),
    (539, "Container_Mimetype_(539)"),
    (542, "Unknown_but_changes_with_filename_only_(542)"),
    // FONT_CONTAINER, BW_CONTAINER or HD_CONTAINER
    (543, "Container_id_(543)"),
    (544, "Unknown_(544)"),
];

/// Tags whose payload is a 1, 2 or 4 byte big endian integer
pub static INTEGER_TAGS: &[(u32, &str)] = &[
    (115, "sample_(115)"),
    (116, "StartOffset_(116)"),
    (121, "K8(121)_Boundary_Section_(121)"),
    (125, "K8_Count_of_Resources_Fonts_Images_(125)"),
    (131, "K8_Unidentified_Count_(131)"),
    (201, "CoverOffset_(201)"),
    (202, "ThumbOffset_(202)"),
    (203, "Fake_Cover_(203)"),
    (204, "Creator_Software_(204)"),
    (205, "Creator_Major_Version_(205)"),
    (206, "Creator_Minor_Version_(206)"),
    (207, "Creator_Build_Number_(207)"),
    (401, "Clipping_Limit_(401)"),
    (402, "Publisher_Limit_(402)"),
    (404, "Text_to_Speech_Disabled_(404)"),
];

/// Tags whose payload is only shown as hex
pub static HEX_TAGS: &[(u32, &str)] = &[
    (209, "Tamper_Proof_Keys_(209_in_hex)"),
    (300, "Font_Signature_(300_in_hex)"),
];

/// How the payload of a known tag is interpreted
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TagKind {
    Text,
    Integer,
    Hex,
}

/// Find the interpretation and label of a tag
pub fn lookup(tag: u32) -> Option<(TagKind, &'static str)> {
    [
        (TagKind::Text, STRING_TAGS),
        (TagKind::Integer, INTEGER_TAGS),
        (TagKind::Hex, HEX_TAGS),
    ]
    .into_iter()
    .find_map(|(kind, table)| {
        table
            .binary_search_by_key(&tag, |&(id, _)| id)
            .ok()
            .map(|i| (kind, table[i].1))
    })
}

/// Decoded value of a metadata record
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum MetadataValue {
    /// Text decoded with the container codec
    Text { value: String },

    /// Unsigned integer together with its width in bytes
    Integer { value: u32, width: u8 },

    /// Payload rendered as lowercase hex
    Hex { value: String },

    /// Integer tag with a payload that is not 1, 2 or 4 bytes
    MalformedInteger { size: u32 },

    /// Tag missing from every table, payload rendered as lowercase hex
    Unknown { value: String },
}

impl MetadataValue {
    /// Warning attached to the value, if it could not be decoded as its tag expects
    pub fn warning(&self, name: &str, tag: u32) -> Option<String> {
        match self {
            MetadataValue::MalformedInteger { size } => Some(format!(
                "Value for {name} has unexpected size of {size}"
            )),
            MetadataValue::Unknown { .. } => Some(format!("Unknown metadata with id {tag} found")),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Text { value } => write!(f, "\"{value}\""),
            MetadataValue::Integer { value, width: 1 } => write!(f, "0x{value:01x}"),
            MetadataValue::Integer { value, width: 2 } => write!(f, "0x{value:02x}"),
            MetadataValue::Integer { value, .. } => write!(f, "0x{value:04x}"),
            MetadataValue::Hex { value } | MetadataValue::Unknown { value } => {
                write!(f, "0x{value}")
            }
            MetadataValue::MalformedInteger { size } => write!(f, "<{size} byte record>"),
        }
    }
}

/// A single EXTH record
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MetadataRecord {
    pub tag: u32,

    /// Label from the tag tables, or `"<tag> (hex)"` for unknown tags
    pub name: Cow<'static, str>,

    pub value: MetadataValue,
}

impl MetadataRecord {
    pub fn warning(&self) -> Option<String> {
        self.value.warning(&self.name, self.tag)
    }
}

/// Decode every record of an EXTH region
///
/// An empty region has no records. Unknown tags and integer records with an unexpected size are
/// kept in the output and logged; only a record that runs past the end of the region is an error.
pub fn decode(blob: &[u8], codec: TextCodec) -> Result<Vec<MetadataRecord>> {
    if blob.is_empty() {
        return Ok(Vec::new());
    }
    if blob.len() < PREAMBLE_LEN {
        return Err(Error::TruncatedRecord {
            index: 0,
            offset: 0,
        });
    }

    let length = BigEndian::read_u32(&blob[4..8]);
    let count = BigEndian::read_u32(&blob[8..12]);
    debug!(length, count, "decoding EXTH region");

    let records = &blob[PREAMBLE_LEN..];
    let mut pos = 0usize;
    let mut out = Vec::with_capacity(count.min(1024) as usize);

    for index in 0..count {
        let truncated = Error::TruncatedRecord {
            index,
            offset: PREAMBLE_LEN + pos,
        };

        let Some(header) = records.get(pos..pos + RECORD_HEADER_LEN) else {
            return Err(truncated);
        };
        let tag = BigEndian::read_u32(&header[0..4]);
        let size = BigEndian::read_u32(&header[4..8]);

        let end = pos.checked_add(size as usize).ok_or(Error::TruncatedRecord {
            index,
            offset: PREAMBLE_LEN + pos,
        })?;
        if (size as usize) < RECORD_HEADER_LEN || end > records.len() {
            return Err(truncated);
        }
        let payload = &records[pos + RECORD_HEADER_LEN..end];

        out.push(decode_record(tag, size, payload, codec));
        pos = end;
    }

    Ok(out)
}

fn decode_record(tag: u32, size: u32, payload: &[u8], codec: TextCodec) -> MetadataRecord {
    let Some((kind, name)) = lookup(tag) else {
        warn!(tag, "unknown metadata with id {tag} found");
        return MetadataRecord {
            tag,
            name: Cow::Owned(format!("{tag} (hex)")),
            value: MetadataValue::Unknown {
                value: hex::encode(payload),
            },
        };
    };

    let value = match kind {
        TagKind::Text => MetadataValue::Text {
            value: codec.decode(payload).into_owned(),
        },
        TagKind::Integer => match payload.len() {
            1 => MetadataValue::Integer {
                value: payload[0] as u32,
                width: 1,
            },
            2 => MetadataValue::Integer {
                value: BigEndian::read_u16(payload) as u32,
                width: 2,
            },
            4 => MetadataValue::Integer {
                value: BigEndian::read_u32(payload),
                width: 4,
            },
            _ => {
                warn!(tag, size, "value for {name} has unexpected size of {size}");
                MetadataValue::MalformedInteger { size }
            }
        },
        TagKind::Hex => MetadataValue::Hex {
            value: hex::encode(payload),
        },
    };

    MetadataRecord {
        tag,
        name: Cow::Borrowed(name),
        value,
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::{decode, lookup, MetadataValue, TagKind, HEX_TAGS, INTEGER_TAGS, STRING_TAGS};
    use crate::{
        codec::TextCodec,
        error::{Error, Result},
    };

    fn blob(records: &[(u32, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (tag, payload) in records {
            body.extend_from_slice(&tag.to_be_bytes());
            body.extend_from_slice(&(payload.len() as u32 + 8).to_be_bytes());
            body.extend_from_slice(payload);
        }

        let mut out = b"EXTH".to_vec();
        out.extend_from_slice(&(body.len() as u32 + 12).to_be_bytes());
        out.extend_from_slice(&(records.len() as u32).to_be_bytes());
        out.extend_from_slice(&body);
        out
    }

    #[test]
    fn tables_are_sorted_and_disjoint() {
        for table in [STRING_TAGS, INTEGER_TAGS, HEX_TAGS] {
            assert!(table.windows(2).all(|w| w[0].0 < w[1].0));
        }
        assert_eq!(lookup(101), Some((TagKind::Text, "Publisher_(101)")));
        assert_eq!(lookup(201), Some((TagKind::Integer, "CoverOffset_(201)")));
        assert_eq!(
            lookup(209),
            Some((TagKind::Hex, "Tamper_Proof_Keys_(209_in_hex)"))
        );
        assert_eq!(lookup(9999), None);
    }

    #[test]
    fn decode_string_record() -> Result<()> {
        let records = decode(&blob(&[(101, b"Acme")]), TextCodec::Utf8)?;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tag, 101);
        assert_eq!(records[0].name, "Publisher_(101)");
        assert_eq!(
            records[0].value,
            MetadataValue::Text {
                value: "Acme".into()
            }
        );
        assert_eq!(records[0].warning(), None);

        Ok(())
    }

    #[test]
    fn decode_integer_widths() -> Result<()> {
        let records = decode(
            &blob(&[
                (115, &[0x01]),
                (116, &[0x01, 0x02]),
                (201, &[0x00, 0x00, 0x01, 0x00]),
            ]),
            TextCodec::default(),
        )?;

        let values: Vec<_> = records.iter().map(|r| r.value.to_string()).collect();
        assert_eq!(values, ["0x1", "0x102", "0x0100"]);
        assert_eq!(
            records[2].value,
            MetadataValue::Integer {
                value: 256,
                width: 4
            }
        );

        Ok(())
    }

    #[traced_test]
    #[test]
    fn decode_malformed_integer_continues() -> Result<()> {
        let records = decode(
            &blob(&[(204, &[0x00, 0x00, 0xC9]), (101, b"Acme")]),
            TextCodec::Utf8,
        )?;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value, MetadataValue::MalformedInteger { size: 11 });
        assert_eq!(
            records[0].warning().as_deref(),
            Some("Value for Creator_Software_(204) has unexpected size of 11")
        );
        assert!(logs_contain("unexpected size of 11"));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn decode_unknown_tag_continues() -> Result<()> {
        let records = decode(
            &blob(&[(9999, &[0xDE, 0xAD]), (503, b"Title")]),
            TextCodec::Utf8,
        )?;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "9999 (hex)");
        assert_eq!(
            records[0].value,
            MetadataValue::Unknown {
                value: "dead".into()
            }
        );
        assert_eq!(records[0].value.to_string(), "0xdead");
        assert!(records[0].warning().is_some());
        assert_eq!(
            records[1].value,
            MetadataValue::Text {
                value: "Title".into()
            }
        );
        assert!(logs_contain("unknown metadata with id 9999"));

        Ok(())
    }

    #[test]
    fn decode_hex_record() -> Result<()> {
        let records = decode(&blob(&[(300, &[0x0A, 0xFF])]), TextCodec::Utf8)?;
        assert_eq!(
            records[0].value,
            MetadataValue::Hex {
                value: "0aff".into()
            }
        );
        Ok(())
    }

    #[test]
    fn decode_empty_region() -> Result<()> {
        assert!(decode(&[], TextCodec::Utf8)?.is_empty());
        Ok(())
    }

    #[test]
    fn decode_truncated_record() {
        let mut data = blob(&[(101, b"Acme"), (102, b"Imprint")]);
        data.truncate(data.len() - 3);

        assert!(matches!(
            decode(&data, TextCodec::Utf8),
            Err(Error::TruncatedRecord {
                index: 1,
                offset: 24
            })
        ));
    }

    #[test]
    fn decode_undersized_record() {
        #[rustfmt::skip]
        let data = [
            b'E', b'X', b'T', b'H',
            0x00, 0x00, 0x00, 0x14,
            0x00, 0x00, 0x00, 0x01,
            0x00, 0x00, 0x00, 0x65,
            0x00, 0x00, 0x00, 0x04,
        ];

        assert!(matches!(
            decode(&data, TextCodec::Utf8),
            Err(Error::TruncatedRecord { index: 0, .. })
        ));
    }
}
