//! Palm database prologue and section table

use std::io::Cursor;

use binrw::{BinRead, BinWrite};
use tracing::debug;

use crate::error::{Error, Result};

/// Size of the fixed palm database prologue
pub const PROLOGUE_LEN: usize = 78;

/// Size of a single entry in the record info list
pub const RECORD_INFO_LEN: usize = 8;

/// Palm database header
///
/// Every multi-byte field is stored big endian. The record count sits at offset 76 and the
/// record info list follows directly at offset 78.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(big)]
pub struct PalmHeader {
    /// Database name, null padded
    pub name: [u8; 32],

    pub attributes: u16,

    pub version: u16,

    /// Creation time, seconds since the palm epoch
    pub created: u32,

    /// Modification time, seconds since the palm epoch
    pub modified: u32,

    /// Time of the last backup
    pub backed_up: u32,

    pub modification_number: u32,

    /// Offset of the application info block, 0 when absent
    pub app_info_offset: u32,

    /// Offset of the sort info block, 0 when absent
    pub sort_info_offset: u32,

    /// Database type, `RBIN` for resource containers
    pub type_id: [u8; 4],

    /// Database creator, `CONT` for resource containers
    pub creator: [u8; 4],

    pub unique_id_seed: u32,

    /// Offset of a continuation record list, unused in practice
    pub next_record_list: u32,

    /// The number of sections stored in the database
    pub records: u16,
}

impl PalmHeader {
    /// The type and creator fields joined, which identify the kind of database
    pub fn signature(&self) -> [u8; 8] {
        let mut signature = [0u8; 8];
        signature[..4].copy_from_slice(&self.type_id);
        signature[4..].copy_from_slice(&self.creator);
        signature
    }

    /// Database name up to the first null byte
    pub fn name(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(self.name.len());
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }
}

/// Entry of the record info list
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(big)]
pub struct RecordInfo {
    /// Offset of the section from the start of the file
    pub offset: u32,

    /// Record flags
    pub attributes: u8,

    pub unique_id: [u8; 3],
}

/// Section table view over a palm database held in memory
#[derive(Debug, Clone)]
pub struct PalmDatabase<'a> {
    data: &'a [u8],
    header: PalmHeader,
    records: Vec<RecordInfo>,
}

impl<'a> PalmDatabase<'a> {
    /// Read the prologue and record info list of a palm database
    pub fn new(data: &'a [u8]) -> Result<PalmDatabase<'a>> {
        if data.len() < PROLOGUE_LEN {
            return Err(Error::TruncatedPrologue { len: data.len() });
        }

        let mut reader = Cursor::new(data);
        let header = PalmHeader::read(&mut reader)?;

        let table_end = PROLOGUE_LEN + header.records as usize * RECORD_INFO_LEN;
        if data.len() < table_end {
            return Err(Error::TruncatedPrologue { len: data.len() });
        }

        let records = (0..header.records)
            .map(|_| RecordInfo::read(&mut reader).map_err(Error::from))
            .collect::<Result<Vec<_>>>()?;

        debug!(sections = records.len(), name = %header.name(), "read palm database");

        Ok(PalmDatabase {
            data,
            header,
            records,
        })
    }

    /// The decoded prologue
    pub fn header(&self) -> &PalmHeader {
        &self.header
    }

    /// Number of sections in the database
    pub fn section_count(&self) -> u16 {
        self.header.records
    }

    /// Start and end offset of a section
    ///
    /// The final section ends at the end of the file, every other section ends where the next one
    /// starts.
    pub fn section_range(&self, index: usize) -> Result<(usize, usize)> {
        let start = self
            .records
            .get(index)
            .ok_or(Error::SectionOutOfRange {
                index,
                count: self.records.len(),
            })?
            .offset as usize;

        let end = match self.records.get(index + 1) {
            Some(next) => next.offset as usize,
            None => self.data.len(),
        };

        Ok((start, end))
    }

    /// Borrow the bytes of a section
    pub fn read_section(&self, index: usize) -> Result<&'a [u8]> {
        let (start, end) = self.section_range(index)?;
        self.data
            .get(start..end)
            .ok_or(Error::InvalidSectionBounds {
                index,
                start,
                end,
                len: self.data.len(),
            })
    }
}
