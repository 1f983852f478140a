#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use packbuf::{
    FixedBufferWriter, ReaderOptions, Special2, StreamingReader, WireRead, WireWrite,
    WriterOptions,
};

#[derive(Debug, Arbitrary)]
enum Op {
    U8(u8),
    U16Small(u16),
    I16Small(i16),
    U24(u32),
    U48(u64),
    Varint(u64),
    VarintPair(u64, u64),
    F64(u64),
    Str8(String),
    Bytes16(Vec<u8>),
    Special2(u8),
}

#[derive(Debug, Arbitrary)]
struct Input {
    capacity: u8,
    window: u8,
    ops: Vec<Op>,
}

// Writes through a fixed buffer of arbitrary size, reads back through a
// streaming window of arbitrary size, and checks every value.
fuzz_target!(|input: Input| {
    let mut w = FixedBufferWriter::with_options(
        Vec::new(),
        WriterOptions {
            capacity: usize::from(input.capacity),
        },
    );
    for op in &input.ops {
        let written = match op {
            Op::U8(v) => w.write_u8(*v),
            Op::U16Small(v) => w.write_u16_small(*v),
            Op::I16Small(v) => w.write_i16_small(*v),
            Op::U24(v) => w.write_u24(*v),
            Op::U48(v) => w.write_u48(*v),
            Op::Varint(v) => w.write_varint(*v),
            Op::VarintPair(a, b) => w.write_varint_pair(*a, *b),
            Op::F64(bits) => w.write_f64(f64::from_bits(*bits)),
            Op::Str8(s) => w.write_str8(s),
            Op::Bytes16(b) => w.write_bytes16(b),
            Op::Special2(byte) => w.write_special2(Special2::from_byte(*byte)),
        };
        written.unwrap();
    }
    let bytes = w.close().unwrap();

    let mut r = StreamingReader::with_options(
        bytes.as_slice(),
        ReaderOptions {
            buffer_size: usize::from(input.window),
        },
    );
    for op in &input.ops {
        match op {
            Op::U8(v) => assert_eq!(r.read_u8().unwrap(), *v),
            Op::U16Small(v) => assert_eq!(r.read_u16_small().unwrap(), *v),
            Op::I16Small(v) => assert_eq!(r.read_i16_small().unwrap(), *v),
            Op::U24(v) => assert_eq!(r.read_u24().unwrap(), *v & 0x00FF_FFFF),
            Op::U48(v) => assert_eq!(r.read_u48().unwrap(), *v & 0xFFFF_FFFF_FFFF),
            Op::Varint(v) => assert_eq!(r.read_varint().unwrap(), *v),
            Op::VarintPair(a, b) => assert_eq!(r.read_varint_pair().unwrap(), (*a, *b)),
            Op::F64(bits) => assert_eq!(r.read_f64().unwrap().to_bits(), *bits),
            Op::Str8(s) => {
                let back = r.read_string8().unwrap();
                assert!(s.starts_with(&back) && back.len() <= 255);
            }
            Op::Bytes16(b) => {
                let back = r.read_bytes16().unwrap();
                assert_eq!(back, b[..b.len().min(usize::from(u16::MAX))]);
            }
            Op::Special2(byte) => {
                assert_eq!(r.read_special2().unwrap(), Special2::from_byte(*byte));
            }
        }
    }
    r.probe_eof().unwrap();
});
