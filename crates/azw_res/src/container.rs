//! Types for reading azw.res containers
//!

use tracing::debug;

use crate::{
    error::{Error, Result},
    header::HeaderSection,
    palmdb::PalmDatabase,
    section::Section,
};

/// Type and creator of a palm database holding HD resources
pub const SIGNATURE: &[u8; 8] = b"RBINCONT";

/// Offset of the signature within the palm prologue
pub const SIGNATURE_OFFSET: usize = 0x3C;

/// azw.res container reader
///
/// ```no_run
/// fn extract_images(data: &[u8]) -> azw_res::error::Result<()> {
///     let container = azw_res::ResourceContainer::new(data)?;
///     println!("Title: {}", container.header()?.title());
///
///     for section in container.sections() {
///         if let Some(image) = section?.hd_image() {
///             image.write_to("azwres_images", false)?;
///         }
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ResourceContainer<'a> {
    palm: PalmDatabase<'a>,
}

impl<'a> ResourceContainer<'a> {
    /// Check the signature of a file and read its section table
    pub fn new(data: &'a [u8]) -> Result<ResourceContainer<'a>> {
        let signature = data.get(SIGNATURE_OFFSET..SIGNATURE_OFFSET + SIGNATURE.len());
        if signature != Some(SIGNATURE.as_slice()) {
            return Err(Error::InvalidSignature {
                found: String::from_utf8_lossy(signature.unwrap_or_default()).into_owned(),
            });
        }

        let palm = PalmDatabase::new(data)?;
        debug!(sections = palm.section_count(), "opened resource container");

        Ok(ResourceContainer { palm })
    }

    /// Number of sections contained in this container.
    pub fn len(&self) -> usize {
        self.palm.section_count() as usize
    }

    /// Whether this container has no sections
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The underlying palm database
    pub fn palm(&self) -> &PalmDatabase<'a> {
        &self.palm
    }

    /// Get a section by index
    pub fn section(&self, index: usize) -> Result<Section<'a>> {
        Ok(Section::new(index, self.palm.read_section(index)?))
    }

    /// Iterate over every section in order
    pub fn sections(&self) -> impl Iterator<Item = Result<Section<'a>>> + '_ {
        (0..self.len()).map(|i| self.section(i))
    }

    /// Decode the CONT header held by section 0
    pub fn header(&self) -> Result<HeaderSection<'a>> {
        HeaderSection::parse(self.palm.read_section(0)?)
    }
}
