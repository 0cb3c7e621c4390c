use proptest::prelude::*;

use buildstream::exec::{ChunkDecoder, DECODE_ERROR_SENTINEL};
use buildstream::output::normalize_newlines;

// Feed `bytes` to a decoder in pieces cut at `cuts`.
fn decode_in_pieces(bytes: &[u8], cuts: &[usize]) -> String {
    let mut decoder = ChunkDecoder::new();
    let mut points: Vec<usize> = cuts.iter().map(|c| c % (bytes.len() + 1)).collect();
    points.sort_unstable();
    points.dedup();

    let mut out = String::new();
    let mut start = 0;
    for p in points.into_iter().chain(std::iter::once(bytes.len())) {
        if p < start {
            continue;
        }
        if let Some(text) = decoder.push(&bytes[start..p]) {
            out.push_str(&text);
        }
        start = p;
    }
    if let Some(text) = decoder.finish() {
        out.push_str(&text);
    }
    out
}

proptest! {
    #[test]
    fn valid_utf8_is_never_mangled_by_read_boundaries(
        text in "(\\PC|\r\n|\r|\n){0,40}",
        cuts in proptest::collection::vec(any::<usize>(), 0..8),
    ) {
        let decoded = decode_in_pieces(text.as_bytes(), &cuts);
        prop_assert!(!decoded.contains(DECODE_ERROR_SENTINEL));
        prop_assert_eq!(normalize_newlines(&decoded), normalize_newlines(&text));
    }
}
