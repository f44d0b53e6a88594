#![no_main]

use arbitrary::Arbitrary;
use fmshard::index::{FmIndex, FmIndexBuilder, IndexConfig, SelfIndex};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    text: Vec<u8>,
    pattern: Vec<u8>,
    sample_step: u8,
    start: u16,
    len: u8,
}

fuzz_target!(|input: Input| {
    // The sentinel byte is reserved
    let text: Vec<u8> = input.text.iter().map(|&b| b.max(1)).collect();
    let config = IndexConfig {
        sample_step: u64::from(input.sample_step.max(1)),
    };
    let built = FmIndexBuilder::new(config).build(&text).unwrap();
    let index = FmIndex::from_built(&built).unwrap();

    let naive = if input.pattern.is_empty() {
        text.len() as u64 + 1
    } else {
        text.windows(input.pattern.len())
            .filter(|w| *w == input.pattern.as_slice())
            .count() as u64
    };
    let range = index.backward_search(&input.pattern);
    assert_eq!(range.end - range.start, naive);

    for rank in range.take(8) {
        let pos = index.invert(rank) as usize;
        if !input.pattern.is_empty() {
            assert_eq!(&text[pos..pos + input.pattern.len()], input.pattern.as_slice());
        }
    }

    let start = (input.start as usize).min(text.len());
    let end = (start + input.len as usize).min(text.len());
    assert_eq!(
        index.extract(start as u64, end as u64),
        &text[start..end]
    );
});
