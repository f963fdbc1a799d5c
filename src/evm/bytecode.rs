//! Creation bytecode inspection.
use crate::constants::evm::CREATION_PROLOGUE;

/// Solidity metadata hash markers, in order of preference, with the total
/// length of the CBOR metadata section they open.
const METADATA_MARKERS: [(&[u8], usize); 3] = [
    // ipfs
    (&[0xa2, 0x64, 0x69, 0x70, 0x66, 0x73, 0x58, 0x22], 53),
    // bzzr1
    (&[0xa2, 0x65, 0x62, 0x7a, 0x7a, 0x72, 0x31, 0x58, 0x20], 52),
    // bzzr0
    (&[0xa2, 0x65, 0x62, 0x7a, 0x7a, 0x72, 0x30, 0x58, 0x20], 43),
];

/// True if `input` looks like contract creation code.
pub fn is_creation(input: &[u8]) -> bool {
    find(input, CREATION_PROLOGUE).is_some()
}

/// Splits creation code into its context (code and metadata) and the
/// appended constructor arguments.
///
/// Markers are tried in order of preference. Code without any known
/// marker is all context.
pub fn split(input: &[u8]) -> (&[u8], &[u8]) {
    for (marker, len) in METADATA_MARKERS {
        if let Some(pos) = rfind(input, marker) {
            let end = (pos + len).min(input.len());
            return input.split_at(end);
        }
    }
    (input, &[])
}

/// Position of first occurrence of `needle` in `haystack`.
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

// Constructor args could embed a marker, the last occurrence is the
// contract's own metadata.
fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).rposition(|w| w == needle)
}
