//! Classification of palm database sections by their leading bytes

use std::borrow::Cow;

use derive_more::derive::{Deref, Display};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::extract::HdImage;

/// Prefix of sections that hold a `|` separated list of embedded resource links
pub const EMBED_PREFIX: &[u8] = b"kindle:embed";

/// Length of the text shown for sections that carry no known tag
pub const PREVIEW_LEN: usize = 12;

/// Known four byte section tags
#[derive(Display, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "snake_case"))]
pub enum SectionTag {
    #[display("FONT")]
    Font,
    #[display("RESC")]
    Resource,
    /// HD image container
    #[display("CRES")]
    HdImage,
    /// The CONT header in section 0
    #[display("Cont Header")]
    ContainerHeader,
    #[display("Empty_Image/Resource_Placeholder")]
    Placeholder,
    #[display("EOF_RECORD")]
    EndOfFile,
}

static SECTION_TAGS: &[(&[u8; 4], SectionTag)] = &[
    (b"FONT", SectionTag::Font),
    (b"RESC", SectionTag::Resource),
    (b"CRES", SectionTag::HdImage),
    (b"CONT", SectionTag::ContainerHeader),
    (b"\xa0\xa0\xa0\xa0", SectionTag::Placeholder),
    (b"\xe9\x8e\r\n", SectionTag::EndOfFile),
];

impl SectionTag {
    /// Match the first four bytes of a section against the known tags
    pub fn from_bytes(data: &[u8]) -> Option<SectionTag> {
        let tag = data.get(..4)?;
        SECTION_TAGS
            .iter()
            .find(|(bytes, _)| bytes.as_slice() == tag)
            .map(|&(_, tag)| tag)
    }
}

/// Resource references of a `kindle:embed` section
#[derive(Deref, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct EmbedLinks(Vec<String>);

impl EmbedLinks {
    pub fn parse(data: &[u8]) -> EmbedLinks {
        EmbedLinks(
            String::from_utf8_lossy(data)
                .split('|')
                .filter(|href| !href.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }
}

/// What a section holds
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize),
    serde(tag = "kind", content = "value", rename_all = "snake_case")
)]
pub enum SectionKind {
    EmbedLinks(EmbedLinks),
    Tagged(SectionTag),
    /// Leading bytes of a section that matched nothing, lossily decoded
    Unknown(String),
}

impl SectionKind {
    pub fn classify(data: &[u8]) -> SectionKind {
        if data.starts_with(EMBED_PREFIX) {
            return SectionKind::EmbedLinks(EmbedLinks::parse(data));
        }
        if let Some(tag) = SectionTag::from_bytes(data) {
            return SectionKind::Tagged(tag);
        }
        let preview = &data[..data.len().min(PREVIEW_LEN)];
        SectionKind::Unknown(String::from_utf8_lossy(preview).into_owned())
    }

    /// One line description, or one line per link for link sections
    pub fn description(&self) -> Cow<'_, str> {
        match self {
            SectionKind::EmbedLinks(links) => Cow::Owned(
                links
                    .iter()
                    .map(|href| format!("\n        {href}"))
                    .collect(),
            ),
            SectionKind::Tagged(tag) => Cow::Owned(tag.to_string()),
            SectionKind::Unknown(text) => Cow::Borrowed(text),
        }
    }
}

/// A borrowed section of the database
#[derive(Deref, Debug, Copy, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub index: usize,
    #[deref(forward)]
    pub data: &'a [u8],
}

impl<'a> Section<'a> {
    pub fn new(index: usize, data: &'a [u8]) -> Section<'a> {
        Section { index, data }
    }

    pub fn kind(&self) -> SectionKind {
        SectionKind::classify(self.data)
    }

    /// The embedded image, if this is a CRES section
    pub fn hd_image(&self) -> Option<HdImage<'a>> {
        (SectionTag::from_bytes(self.data) == Some(SectionTag::HdImage))
            .then(|| HdImage::from_section(self))
    }
}
