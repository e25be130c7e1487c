use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
};

use azw_res::{
    error::Result,
    exth::MetadataRecord,
    header::HeaderField,
    ImageKind, ResourceContainer, Section, SectionKind, SectionTag, TextCodec,
};
use itertools::Itertools;
use owo_colors::{OwoColorize, Stream::Stdout};
use serde::Serialize;
use tracing::warn;

/// Image found in a CRES section
#[derive(Debug, Serialize)]
pub struct ExtractedImage {
    pub name: String,
    /// Where the image was written, absent when writing it failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub kind: Option<ImageKind>,
}

#[derive(Debug, Serialize)]
pub struct SectionEntry {
    pub index: usize,
    pub length: usize,
    /// Absent when the section table entry points outside of the file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<SectionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ExtractedImage>,
    /// Problem that was skipped over while handling this section
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Everything learned about a container, printed as text or serialized as JSON
#[derive(Debug, Serialize)]
pub struct Report {
    pub file: PathBuf,
    pub header: Vec<HeaderField>,
    pub exth_length: usize,
    pub codec: TextCodec,
    pub title: String,
    pub metadata: Vec<MetadataRecord>,
    /// Reason the EXTH region could only be partially decoded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_warning: Option<String>,
    pub sections: Vec<SectionEntry>,
}

impl Report {
    /// Decode a container and extract its HD images into `directory`
    ///
    /// Only a file that is not a container or whose header section cannot be read is an error.
    /// Everything after that is recorded as a warning next to the affected section.
    pub fn build(file: &Path, data: &[u8], directory: &Path, overwrite: bool) -> Result<Report> {
        let container = ResourceContainer::new(data)?;
        let header = container.header()?;

        let (metadata, metadata_warning) = match header.metadata() {
            Ok(metadata) => (metadata, None),
            Err(e) => {
                warn!("{e}");
                (Vec::new(), Some(e.to_string()))
            }
        };

        let sections = container
            .sections()
            .enumerate()
            .map(|(index, section)| match section {
                Ok(section) => section_entry(&section, directory, overwrite),
                Err(e) => {
                    warn!("{e}");
                    SectionEntry {
                        index,
                        length: 0,
                        kind: None,
                        image: None,
                        warning: Some(e.to_string()),
                    }
                }
            })
            .collect();

        Ok(Report {
            file: file.to_path_buf(),
            header: header.header().fields(),
            exth_length: header.exth().len(),
            codec: header.codec(),
            title: header.title().to_owned(),
            metadata,
            metadata_warning,
            sections,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &ExtractedImage> {
        self.sections.iter().filter_map(|s| s.image.as_ref())
    }
}

fn section_entry(section: &Section<'_>, directory: &Path, overwrite: bool) -> SectionEntry {
    let mut failure = None;
    let image = section.hd_image().map(|image| {
        let path = match image.write_to(directory, overwrite) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(section = section.index, "{e}");
                failure = Some(e.to_string());
                None
            }
        };
        ExtractedImage {
            name: image.file_name(),
            path,
            kind: image.kind(),
        }
    });

    SectionEntry {
        index: section.index,
        length: section.len(),
        kind: Some(section.kind()),
        image,
        warning: failure,
    }
}

fn warning(f: &mut fmt::Formatter<'_>, message: &str) -> fmt::Result {
    writeln!(
        f,
        "{}",
        format!("Warning: {message}").if_supports_color(Stdout, |t| t.yellow())
    )
}

impl Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}",
            "First Header Dump from Section 0".if_supports_color(Stdout, |t| t.bold())
        )?;
        for field in &self.header {
            writeln!(f, "  {field}")?;
        }
        writeln!(f, "EXTH Region Length:  0x{:x}", self.exth_length)?;
        writeln!(f, "EXTH MetaData\nTitle:\n{}", self.title)?;
        if let Some(message) = &self.metadata_warning {
            warning(f, message)?;
        }

        for record in &self.metadata {
            writeln!(f)?;
            if let Some(message) = record.warning() {
                warning(f, &message)?;
            }
            writeln!(f, "    Key: \"{}\"\n        Value: {}", record.name, record.value)?;
        }

        writeln!(
            f,
            "\n{}",
            "Map of Palm DB Sections".if_supports_color(Stdout, |t| t.bold())
        )?;
        writeln!(f, "    Dec  - Hex : Description")?;
        writeln!(f, "    ---- - ----  -----------")?;

        for section in &self.sections {
            let Some(kind) = &section.kind else {
                writeln!(f, "    {:04} - {:04x}: unreadable", section.index, section.index)?;
                if let Some(message) = &section.warning {
                    warning(f, message)?;
                }
                continue;
            };

            if section.index != 0 || *kind != SectionKind::Tagged(SectionTag::ContainerHeader) {
                writeln!(
                    f,
                    "    {:04} - {:04x}: {} [{}]",
                    section.index,
                    section.index,
                    kind.description(),
                    section.length
                )?;
            }

            if let Some(image) = &section.image {
                if image.kind.is_none() {
                    warning(
                        f,
                        &format!(
                            "CRES Section {} does not contain a recognised resource",
                            section.index
                        ),
                    )?;
                }
                match &section.warning {
                    Some(message) => warning(f, message)?,
                    None => writeln!(
                        f,
                        "        Extracting HD image: {} from section {}",
                        image.name, section.index
                    )?,
                }
            }
        }

        let images = self
            .images()
            .filter(|i| i.path.is_some())
            .map(|i| i.name.as_str())
            .join(", ");
        if !images.is_empty() {
            writeln!(f, "\nExtracted: {images}")?;
        }

        Ok(())
    }
}
