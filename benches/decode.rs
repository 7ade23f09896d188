use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use serial_framegrab::image_pipeline::{
    decode, DecodeOptions, FrameBuffer, FrameGeometry, PixelFormat, Rgb565Expansion, RowOrder,
};

fn generate_mock_frame(geometry: FrameGeometry) -> FrameBuffer {
    let mut data = Vec::with_capacity(geometry.pixel_count() * 2);
    for y in 0..geometry.height {
        for x in 0..geometry.width {
            let value = ((x + y) % 256) as u8;
            data.push(value);
            data.push(value.wrapping_mul(3));
        }
    }
    FrameBuffer::from_bytes(data)
}

fn benchmark_formats(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_by_format");
    let geometry = FrameGeometry::QVGA;
    let frame = generate_mock_frame(geometry);
    let options = DecodeOptions::new(RowOrder::TopFirst);

    for format in PixelFormat::ALL {
        group.bench_with_input(
            BenchmarkId::from_parameter(format),
            &frame,
            |b, frame| {
                b.iter(|| decode(format, black_box(frame), geometry, &options));
            },
        );
    }

    group.finish();
}

fn benchmark_rgb565_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("rgb565_expansion");
    let geometry = FrameGeometry::QVGA;
    let frame = generate_mock_frame(geometry);

    let policies = vec![
        (Rgb565Expansion::Shift, "shift"),
        (Rgb565Expansion::Proportional, "proportional"),
    ];

    for (expansion, label) in policies {
        let options = DecodeOptions::new(RowOrder::TopFirst).with_expansion(expansion);
        group.bench_with_input(BenchmarkId::from_parameter(label), &frame, |b, frame| {
            b.iter(|| decode(PixelFormat::Rgb565, black_box(frame), geometry, &options));
        });
    }

    group.finish();
}

fn benchmark_row_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("row_order");
    let sizes = vec![
        (FrameGeometry::new(160, 120), "160x120"),
        (FrameGeometry::QVGA, "320x240"),
        (FrameGeometry::new(640, 480), "640x480"),
    ];

    for (geometry, label) in sizes {
        let frame = generate_mock_frame(geometry);
        let options = DecodeOptions::new(RowOrder::BottomFirst);
        group.bench_with_input(BenchmarkId::from_parameter(label), &frame, |b, frame| {
            b.iter(|| decode(PixelFormat::Yuv422, black_box(frame), geometry, &options));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_formats, benchmark_rgb565_expansion, benchmark_row_order);
criterion_main!(benches);
