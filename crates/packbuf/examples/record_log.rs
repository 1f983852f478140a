//! Writes a small append-only event log to a file and reads it back.
//!
//! Each record is a varint timestamp delta, a packed [`Special2`] header and a
//! length-prefixed message. The writer uses a tiny buffer so the file is
//! written in many small flushes; the reader then walks the file through a
//! streaming window and finally seeks back to replay the last record.
//!
//! Run with
//!
//! ```bash
//! cargo run -p packbuf --example record_log
//! ```

use std::{error::Error as StdError, fs::File, io::SeekFrom, path::Path};

use packbuf::{
    Error, FixedBufferWriter, ReaderOptions, Special2, StreamingReader, WireRead, WireWrite,
    WriterOptions,
};

struct Event<'a> {
    delta: u64,
    header: Special2,
    message: &'a str,
}

const EVENTS: [Event<'static>; 4] = [
    Event {
        delta: 0,
        header: Special2 {
            value1: 1,
            value2: 0,
            value3: 0,
            flag: false,
        },
        message: "service started",
    },
    Event {
        delta: 1_250,
        header: Special2 {
            value1: 2,
            value2: 1,
            value3: 0,
            flag: false,
        },
        message: "cache warmed: 4096 entries",
    },
    Event {
        delta: 86_400_000,
        header: Special2 {
            value1: 4,
            value2: 3,
            value3: 2,
            flag: true,
        },
        message: "disk nearly full ⚠",
    },
    Event {
        delta: 17,
        header: Special2 {
            value1: 1,
            value2: 0,
            value3: 1,
            flag: false,
        },
        message: "shutdown requested",
    },
];

fn write_log(path: &Path) -> Result<Vec<u64>, Box<dyn StdError>> {
    let file = File::create(path)?;
    let mut w = FixedBufferWriter::with_options(file, WriterOptions { capacity: 32 });
    let mut offsets = Vec::with_capacity(EVENTS.len());
    let mut written = 0u64;
    for event in &EVENTS {
        offsets.push(written);
        w.write_varint(event.delta)?;
        w.write_special2(event.header)?;
        w.write_str16(event.message)?;
        // varint width byte + value, header byte, u16 length + text
        let delta_len = 1 + u64::from(packbuf::varint_width(event.delta));
        written += delta_len + 1 + 2 + event.message.len() as u64;
    }
    w.close()?;
    Ok(offsets)
}

fn read_event<R: WireRead>(r: &mut R) -> Result<(u64, Special2, String), Error> {
    Ok((r.read_varint()?, r.read_special2()?, r.read_string16()?))
}

fn main() -> Result<(), Box<dyn StdError>> {
    let path = std::env::temp_dir().join("packbuf-record-log.bin");
    let offsets = write_log(&path)?;

    let file = File::open(&path)?;
    let mut r = StreamingReader::with_options(file, ReaderOptions { buffer_size: 16 });
    let mut clock = 0u64;
    for _ in &EVENTS {
        let (delta, header, message) = read_event(&mut r)?;
        clock += delta;
        println!(
            "t={clock:>10} level={} component={} flagged={} {message}",
            header.value1, header.value2, header.flag
        );
    }
    r.probe_eof()?;

    if let Some(&last) = offsets.last() {
        r.seek(SeekFrom::Start(last))?;
        let (_, _, message) = read_event(&mut r)?;
        println!("replayed: {message}");
    }

    std::fs::remove_file(&path)?;
    Ok(())
}
