use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

pub mod read {
    use azw_res::{
        palmdb::{PalmHeader, RecordInfo, PROLOGUE_LEN},
        sniff, ResourceContainer,
    };
    use binrw::BinWrite;
    use divan::Bencher;
    use std::io::Cursor;

    const SECTIONS: usize = 512;

    fn get_input() -> Vec<u8> {
        let mut header = b"CONT".to_vec();
        header.extend_from_slice(&[0u8; 8]);
        header.extend_from_slice(&65001u32.to_be_bytes());
        header.extend_from_slice(&[0u8; 24]);
        header.extend_from_slice(&48u32.to_be_bytes());
        header.extend_from_slice(&0u32.to_be_bytes());

        let mut image = b"CRES\x00\x00\x00\x00\x00\x00\x00\x0c\xFF\xD8\xFF\xE0\x00\x10JFIF".to_vec();
        image.resize(64 * 1024, 0);
        image.extend_from_slice(&[0xFF, 0xD9]);

        let sections: Vec<&[u8]> = std::iter::once(header.as_slice())
            .chain(std::iter::repeat(image.as_slice()).take(SECTIONS - 1))
            .collect();

        let mut out = Cursor::new(Vec::new());
        PalmHeader {
            type_id: *b"RBIN",
            creator: *b"CONT",
            records: SECTIONS as u16,
            ..Default::default()
        }
        .write(&mut out)
        .unwrap();

        let mut offset = PROLOGUE_LEN + SECTIONS * 8;
        for section in &sections {
            RecordInfo {
                offset: offset as u32,
                ..Default::default()
            }
            .write(&mut out)
            .unwrap();
            offset += section.len();
        }

        let mut out = out.into_inner();
        for section in sections {
            out.extend_from_slice(section);
        }
        out
    }

    #[divan::bench]
    fn open(bencher: Bencher) {
        bencher.with_inputs(get_input).bench_refs(|data| {
            divan::black_box(ResourceContainer::new(data).unwrap());
        });
    }

    #[divan::bench]
    fn classify_all(bencher: Bencher) {
        bencher.with_inputs(get_input).bench_refs(|data| {
            let container = ResourceContainer::new(data).unwrap();
            for section in container.sections() {
                divan::black_box(section.unwrap().kind());
            }
        });
    }

    #[divan::bench]
    fn sniff_images(bencher: Bencher) {
        bencher.with_inputs(get_input).bench_refs(|data| {
            let container = ResourceContainer::new(data).unwrap();
            for section in container.sections() {
                if let Some(image) = section.unwrap().hd_image() {
                    divan::black_box(sniff(image.data()));
                }
            }
        });
    }
}
