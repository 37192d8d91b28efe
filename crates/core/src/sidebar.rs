#![forbid(unsafe_code)]

//! Stable sidebar identifiers for tag rows.
//!
//! UI lists key their rows by integer id. Tag rows are derived data with no
//! persistent primary key of their own, so the id is computed from the tag
//! key: a 32-bit FNV-1a hash offset below the reserved sentinel range. The
//! same key always yields the same id across reloads, and every id is
//! strictly negative so it can never collide with a real record id.

const FNV32_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

/// Ids in `SIDEBAR_RESERVED_FLOOR..0` are reserved for fixed sidebar entries
/// (inbox, today, calendar). Tag ids sit strictly below the floor.
pub const SIDEBAR_RESERVED_FLOOR: i64 = -1_000;

fn fnv1a32(bytes: &[u8]) -> u32 {
    let mut hash = FNV32_OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(FNV32_PRIME);
    }
    hash
}

pub fn stable_sidebar_id(key: &str) -> i64 {
    SIDEBAR_RESERVED_FLOOR - 1 - i64::from(fnv1a32(key.as_bytes()))
}
