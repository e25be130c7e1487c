//! This library handles reading the **azw.res** HD image containers that accompany Kindle books.
//!
//! # azw.res Container Format Documentation
//!
//! An azw.res file is a palm database with the type `RBIN` and creator `CONT`. Its sections carry
//! the high resolution images, fonts and resources of a book, along with a copy of the book's
//! metadata.
//!
//! ## File Structure
//!
//! The file starts with the palm database prologue, followed by the record info list and the
//! sections packed back to back.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Name                   | 32 bytes: null padded database name                        |
//! | 0x003C         | Type                   | 4 bytes: `RBIN`                                            |
//! | 0x0040         | Creator                | 4 bytes: `CONT`                                            |
//! | 0x004C         | Record Count           | 2 bytes: Number of sections                                |
//! | 0x004E         | Record Info List       | 8 bytes per section: offset, attributes, unique id         |
//!
//! A section ends where the next one begins, the final section ends at the end of the file.
//!
//! ### CONT Header
//!
//! Section 0 starts with the tag `CONT` and a 48 byte header:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Magic                  | 4 bytes: `CONT`                                         |
//! | 0x0004         | Record Size            | 4 bytes                                                 |
//! | 0x0008         | Type                   | 2 bytes                                                 |
//! | 0x000A         | Count                  | 2 bytes                                                 |
//! | 0x000C         | Codepage               | 4 bytes: 1252 (windows-1252) or 65001 (utf-8)           |
//! | 0x0010         | Unknown                | 8 bytes                                                 |
//! | 0x0018         | Resource Count         | 4 bytes                                                 |
//! | 0x001C         | Non-placeholder Count  | 4 bytes                                                 |
//! | 0x0020         | Href Table Offset      | 4 bytes                                                 |
//! | 0x0024         | Unknown                | 4 bytes                                                 |
//! | 0x0028         | Title Offset           | 4 bytes: from the start of the section                  |
//! | 0x002C         | Title Length           | 4 bytes                                                 |
//!
//! The rest of the section is an EXTH metadata region, see [`exth`].
//!
//! ### Sections
//!
//! Every other section is identified by its first four bytes:
//!
//! - **`FONT`**: an embedded font
//! - **`RESC`**: a resource description
//! - **`CRES`**: an HD image, after a 12 byte sub-header
//! - **`A0 A0 A0 A0`**: a placeholder for a missing image or resource
//! - **`E9 8E 0D 0A`**: end of file marker
//! - **`kindle:embed`**: a `|` separated list of embedded resource links
//!
//! ## Additional Information
//!
//! - **File Extension**: `.azw.res`
//! - **Endianness**: Big-endian for all multi-byte integers
//!

pub mod codec;
pub mod container;
pub mod error;
pub mod exth;
pub mod extract;
pub mod header;
pub mod palmdb;
pub mod section;
pub mod sniff;

pub use codec::TextCodec;
pub use container::ResourceContainer;
pub use extract::HdImage;
pub use section::{Section, SectionKind, SectionTag};
pub use sniff::{sniff, ImageKind};
