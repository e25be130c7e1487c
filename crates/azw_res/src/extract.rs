//! Extraction of the images held by CRES sections

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    section::Section,
    sniff::{sniff, ImageKind, FALLBACK_EXTENSION},
};

/// Size of the sub-header in front of the image payload of a CRES section
pub const CRES_HEADER_LEN: usize = 12;

/// Image payload of a CRES section
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HdImage<'a> {
    index: usize,
    data: &'a [u8],
    kind: Option<ImageKind>,
}

impl<'a> HdImage<'a> {
    /// Strip the sub-header of a CRES section and sniff what is left
    pub fn from_section(section: &Section<'a>) -> HdImage<'a> {
        let data = section.data.get(CRES_HEADER_LEN..).unwrap_or_default();
        let kind = sniff(data);
        if kind.is_none() {
            warn!(
                section = section.index,
                "CRES section {} does not contain a recognised resource", section.index
            );
        }

        HdImage {
            index: section.index,
            data,
            kind,
        }
    }

    /// Index of the section the image was taken from
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn kind(&self) -> Option<ImageKind> {
        self.kind
    }

    pub fn extension(&self) -> String {
        self.kind
            .map_or_else(|| FALLBACK_EXTENSION.to_owned(), |kind| kind.to_string())
    }

    /// Output file name, numbered by section index
    pub fn file_name(&self) -> String {
        format!("HDimage{:05}.{}", self.index, self.extension())
    }

    /// Write the payload into `directory`, creating it if needed
    ///
    /// The payload is written to a temporary file that is renamed into place once complete, so a
    /// failed write leaves nothing behind. Unless `overwrite` is set an existing image is left
    /// alone and reported as [`Error::OutputExists`].
    pub fn write_to(&self, directory: impl AsRef<Path>, overwrite: bool) -> Result<PathBuf> {
        let directory = directory.as_ref();
        fs::create_dir_all(directory)?;

        let path = directory.join(self.file_name());
        if !overwrite && path.exists() {
            return Err(Error::OutputExists(path));
        }

        let partial = directory.join(format!(".{}.part", self.file_name()));
        if let Err(e) = write_complete(&partial, self.data, &path) {
            let _ = fs::remove_file(&partial);
            return Err(e.into());
        }

        info!("extracted HD image {} from section {}", path.display(), self.index);
        Ok(path)
    }
}

fn write_complete(partial: &Path, data: &[u8], path: &Path) -> std::io::Result<()> {
    let mut out = fs::File::create(partial)?;
    out.write_all(data)?;
    out.sync_all()?;
    drop(out);
    fs::rename(partial, path)
}
