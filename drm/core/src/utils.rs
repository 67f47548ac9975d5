/**
    Const-compatible case-insensitive ASCII byte comparison.
*/
pub const fn eq_ignore_ascii_case(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i].to_ascii_lowercase() != b[i].to_ascii_lowercase() {
            return false;
        }
        i += 1;
    }
    true
}

/**
    Normalize a raw key identifier to exactly 16 bytes.

    1. If the bytes are valid UTF-8 and parse as a decimal integer, that
       integer is returned as 16 big-endian bytes.
    2. Otherwise the bytes are zero-padded at the end, or truncated, to 16.
*/
pub fn normalize_kid(id: &[u8]) -> [u8; 16] {
    if let Ok(s) = std::str::from_utf8(id)
        && let Ok(n) = s.parse::<u128>()
    {
        return n.to_be_bytes();
    }

    let mut kid = [0u8; 16];
    let len = id.len().min(16);
    kid[..len].copy_from_slice(&id[..len]);
    kid
}
