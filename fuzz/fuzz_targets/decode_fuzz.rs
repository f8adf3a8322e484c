#![no_main]
use huffarc::archive::{ArchiveDecoder, decode_memory};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode or fail with an error, never panic.
    let _ = decode_memory(data);
    let _ = ArchiveDecoder::new(data).list();
});
