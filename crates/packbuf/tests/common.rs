#![allow(missing_docs, dead_code)]

use core::fmt::Write as _;

/// Lowercase hex, one space between bytes.
pub fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        write!(out, "{b:02x}").unwrap();
    }
    out
}

/// Renders `label: hex` lines, one per row.
pub fn render(rows: &[(&str, Vec<u8>)]) -> String {
    rows.iter()
        .map(|(label, bytes)| format!("{label}: {}", hex(bytes)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A small log record.
pub struct Entry {
    pub id: u64,
    pub level: u8,
    pub message: String,
}

pub fn entries(count: u64) -> Vec<Entry> {
    (0..count)
        .map(|id| {
            let level = u8::try_from(id % 5).unwrap();
            let accents = usize::try_from(id % 7).unwrap();
            Entry {
                id: id * 977,
                level,
                message: format!("event #{id} {}", "ä".repeat(accents)),
            }
        })
        .collect()
}
