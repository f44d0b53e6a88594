#![no_main]

use fmshard::index::{Backing, FmIndex};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary files must be rejected, never panic while loading
    let _ = FmIndex::from_backing(Backing::from_vec(data.to_vec()));
});
