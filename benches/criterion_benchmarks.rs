use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use huffarc::archive::{decode_memory, encode_entries};
use huffarc::huffman::{CanonicalTable, CodeTree, FrequencyTable};
use std::fs;
use std::path::Path;

fn gen_data(size: usize, seed: u64) -> Vec<u8> {
    let mut s = seed;
    let mut out = Vec::with_capacity(size);
    for _ in 0..size {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        out.push((s >> 33) as u8);
    }
    out
}

/// Text-like data: a small alphabet with a skewed distribution.
fn gen_text(size: usize, seed: u64) -> Vec<u8> {
    const ALPHABET: &[u8] = b"eeeeeeeeetttttaaaaooooiiinnnsshhrrdlcu  \n";
    gen_data(size, seed)
        .into_iter()
        .map(|b| ALPHABET[b as usize % ALPHABET.len()])
        .collect()
}

fn encode(name: &str, data: &[u8]) -> Vec<u8> {
    encode_entries(Vec::new(), [(name, data)]).unwrap()
}

fn write_ratio_snapshot() {
    let mut csv = String::from("workload,input_bytes,archive_bytes,ratio\n");
    for (name, data) in [
        ("random", gen_data(1024 * 1024, 1)),
        ("text", gen_text(1024 * 1024, 2)),
        ("constant", vec![b'x'; 1024 * 1024]),
    ] {
        let archive = encode(name, &data);
        let ratio = archive.len() as f64 / data.len() as f64;
        csv.push_str(&format!(
            "{name},{},{},{ratio}\n",
            data.len(),
            archive.len()
        ));
    }
    let out_dir = Path::new("target/criterion/custom_reports");
    let _ = fs::create_dir_all(out_dir);
    let _ = fs::write(out_dir.join("ratio_snapshot.csv"), csv);
}

fn bench_encoding_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("encoding_speed_mb_s");
    for size in [64 * 1024usize, 1024 * 1024, 8 * 1024 * 1024] {
        let data = gen_text(size, 1);
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let archive = encode("bench", black_box(&data));
                black_box(archive);
            });
        });
    }
    g.finish();
}

fn bench_decoding_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("decoding_speed_mb_s");
    for size in [64 * 1024usize, 1024 * 1024, 8 * 1024 * 1024] {
        let data = gen_text(size, 2);
        let archive = encode("bench", &data);
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let entries = decode_memory(black_box(&archive)).unwrap();
                black_box(entries);
            });
        });
    }
    g.finish();
}

fn bench_ratio_by_workload(c: &mut Criterion) {
    write_ratio_snapshot();
    let mut g = c.benchmark_group("roundtrip_by_workload");
    let workloads = [
        ("random", gen_data(1024 * 1024, 3)),
        ("text", gen_text(1024 * 1024, 4)),
        ("constant", vec![0u8; 1024 * 1024]),
    ];
    for (name, data) in &workloads {
        g.throughput(Throughput::Bytes(data.len() as u64));
        g.bench_function(*name, |b| {
            b.iter(|| {
                let archive = encode(name, data);
                let entries = decode_memory(&archive).unwrap();
                black_box(entries);
            });
        });
    }
    g.finish();
}

fn bench_table_construction(c: &mut Criterion) {
    let mut g = c.benchmark_group("table_construction");
    for (name, data) in [
        ("full_alphabet", gen_data(64 * 1024, 5)),
        ("text_alphabet", gen_text(64 * 1024, 6)),
    ] {
        let freq = FrequencyTable::for_record(b"bench", &data);
        g.bench_function(name, |b| {
            b.iter(|| {
                let lengths = CodeTree::from_frequencies(black_box(&freq))
                    .unwrap()
                    .code_lengths();
                let table = CanonicalTable::from_lengths(lengths).unwrap();
                black_box(table);
            });
        });
    }
    g.finish();
}

fn bench_many_small_files(c: &mut Criterion) {
    let mut g = c.benchmark_group("many_small_files");
    for count in [10usize, 100, 1000] {
        let entries: Vec<(String, Vec<u8>)> = (0..count)
            .map(|i| (format!("file{i}"), gen_text(512, i as u64)))
            .collect();
        g.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                let archive =
                    encode_entries(Vec::new(), entries.iter().map(|(n, d)| (n, d))).unwrap();
                black_box(archive);
            });
        });
    }
    g.finish();
}

criterion_group!(
    benches,
    bench_encoding_speed,
    bench_decoding_speed,
    bench_ratio_by_workload,
    bench_table_construction,
    bench_many_small_files
);
criterion_main!(benches);
