#![no_main]
use huffarc::archive::{decode_memory, encode_entries};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks how many records the payload is split into.
    let records = 1 + (data[0] % 4) as usize;
    let payload = &data[1..];
    let step = payload.len().div_ceil(records).max(1);

    let mut entries: Vec<(String, &[u8])> = payload
        .chunks(step)
        .enumerate()
        .map(|(i, chunk)| (format!("entry{i}"), chunk))
        .collect();
    if entries.is_empty() {
        entries.push(("empty".to_string(), &[] as &[u8]));
    }

    let archive = encode_entries(Vec::new(), entries.iter().map(|(n, d)| (n, *d))).unwrap();
    let decoded = decode_memory(&archive).unwrap();

    assert_eq!(decoded.len(), entries.len());
    for (got, (name, want)) in decoded.iter().zip(&entries) {
        assert_eq!(&got.name, name);
        assert_eq!(got.data.as_slice(), *want);
    }
});
