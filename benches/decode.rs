use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ur_fountain::{decode, Decoder, Encoder};

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("decode bytes", |b| b.iter(|| decode(black_box("ur:bytes/hdeymejtswhhylkepmykhhtsytsnoyoyaxaedsuttydmmhhpktpmsrjtgwdpfnsboxgwlbaawzuefywkdplrsrjynbvygabwjldapfcsdwkbrkch"))));

    let message: Vec<u8> = (0..32767u32).map(|i| (i % 251) as u8).collect();
    let mut encoder = Encoder::bytes(&message, 1000).unwrap();
    // every other part lost, so the decoder has to peel mixed parts
    let parts: Vec<String> = (0..400)
        .map(|_| encoder.next_part())
        .step_by(2)
        .collect();
    c.bench_function("decode multipart", |b| {
        b.iter(|| Decoder::decode_parts(black_box(&parts)).unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
