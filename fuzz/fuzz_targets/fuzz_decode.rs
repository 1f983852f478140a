#![no_main]

use libfuzzer_sys::fuzz_target;
use packbuf::{BytesReader, StreamingReader, WireRead};

// Decodes arbitrary bytes with both readers, driven by the first byte as an
// opcode stream. Neither reader may panic, and both must agree.
fuzz_target!(|data: &[u8]| {
    let Some((&program, body)) = data.split_first() else {
        return;
    };
    let mut bytes = BytesReader::new(body);
    let mut stream = StreamingReader::new(body);
    for step in 0..64u32 {
        let op = program.rotate_left(step % 8) % 8;
        let (a, b) = match op {
            0 => (bytes.read_varint().ok(), stream.read_varint().ok()),
            1 => (
                bytes.read_varint_pair().ok().map(|(x, y)| x ^ y),
                stream.read_varint_pair().ok().map(|(x, y)| x ^ y),
            ),
            2 => (
                bytes.read_rune().ok().map(u64::from),
                stream.read_rune().ok().map(u64::from),
            ),
            3 => (
                bytes.read_string8().ok().map(|s| s.len() as u64),
                stream.read_string8().ok().map(|s| s.len() as u64),
            ),
            4 => (
                bytes.read_i16_small().ok().map(|v| v as u64),
                stream.read_i16_small().ok().map(|v| v as u64),
            ),
            5 => (
                bytes.read_bytes32().ok().map(|v| v.len() as u64),
                stream.read_bytes32().ok().map(|v| v.len() as u64),
            ),
            6 => (
                bytes.read_u16_small().ok().map(u64::from),
                stream.read_u16_small().ok().map(u64::from),
            ),
            _ => (
                bytes.read_special().ok().map(|s| u64::from(s.to_byte())),
                stream.read_special().ok().map(|s| u64::from(s.to_byte())),
            ),
        };
        assert_eq!(a, b);
        if a.is_none() {
            break;
        }
    }
});
