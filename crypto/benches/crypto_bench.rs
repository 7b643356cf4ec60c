use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn fingerprint_1kb_bench(c: &mut Criterion) {
    let data = vec![0xCDu8; 1024];

    c.bench_function("fingerprint_1KB", |b| {
        b.iter(|| docguard_crypto::fingerprint(black_box(&data)))
    });
}

fn fingerprint_4mb_bench(c: &mut Criterion) {
    let data = vec![0x5Au8; 4 * 1024 * 1024];

    c.bench_function("fingerprint_4MB", |b| {
        b.iter(|| docguard_crypto::fingerprint(black_box(&data)))
    });
}

fn fingerprint_reader_4mb_bench(c: &mut Criterion) {
    let data = vec![0x5Au8; 4 * 1024 * 1024];

    c.bench_function("fingerprint_reader_4MB", |b| {
        b.iter(|| docguard_crypto::fingerprint_reader(std::io::Cursor::new(black_box(&data))))
    });
}

fn fingerprint_many_bench(c: &mut Criterion) {
    let files: Vec<Vec<u8>> = (0..64u8).map(|i| vec![i; 64 * 1024]).collect();
    let inputs: Vec<&[u8]> = files.iter().map(|f| f.as_slice()).collect();

    c.bench_function("fingerprint_many_64x64KB", |b| {
        b.iter(|| docguard_crypto::fingerprint_many(black_box(&inputs)))
    });
}

fn ed25519_verify_bench(c: &mut Criterion) {
    let kp = docguard_crypto::keypair_from_seed(&[42u8; 32]);
    let msg = docguard_crypto::fingerprint(b"bench").signing_message();
    let sig = docguard_crypto::sign_message(&msg, &kp.private);

    c.bench_function("ed25519_verify_claim", |b| {
        b.iter(|| docguard_crypto::verify_signature(black_box(&msg), &sig, &kp.public))
    });
}

criterion_group!(
    benches,
    fingerprint_1kb_bench,
    fingerprint_4mb_bench,
    fingerprint_reader_4mb_bench,
    fingerprint_many_bench,
    ed25519_verify_bench,
);
criterion_main!(benches);
