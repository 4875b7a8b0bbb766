use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use onera_io::image_pipeline::{CodecConfig, OneraImageIO, RasterGeometry, Region};

fn generate_pixels(geometry: &RasterGeometry) -> Vec<f32> {
    (0..geometry.component_count())
        .map(|i| (i % 1024) as f32 * 0.5)
        .collect()
}

fn benchmark_full_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_write");
    let dir = tempfile::tempdir().unwrap();

    for size in [128u32, 512, 1024] {
        let geometry = RasterGeometry::complex_f32(size, size);
        let pixels = generate_pixels(&geometry);
        let path = dir.path().join(format!("write_{}.ent", size));

        group.bench_with_input(BenchmarkId::from_parameter(size), &pixels, |b, data| {
            b.iter(|| {
                let mut writer = OneraImageIO::create(&path, geometry, CodecConfig::default()).unwrap();
                writer.write_region(&geometry.full_region(), black_box(data)).unwrap();
                writer.finish().unwrap();
            });
        });
    }

    group.finish();
}

fn benchmark_strip_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("strip_read");
    let dir = tempfile::tempdir().unwrap();
    let geometry = RasterGeometry::complex_f32(1024, 1024);
    let path = dir.path().join("read.ent");

    let mut writer = OneraImageIO::create(&path, geometry, CodecConfig::default()).unwrap();
    writer.write_region(&geometry.full_region(), &generate_pixels(&geometry)).unwrap();
    writer.finish().unwrap();

    for strip_rows in [1u32, 16, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(strip_rows), &strip_rows, |b, &rows| {
            let mut reader = OneraImageIO::new(&path);
            reader.read_image_information().unwrap();
            b.iter(|| {
                let mut first = 0;
                while first < geometry.height {
                    let region = Region::new(first, 0, rows.min(geometry.height - first), geometry.width);
                    black_box(reader.read_region(&region).unwrap());
                    first += rows;
                }
            });
        });
    }

    group.finish();
}

fn benchmark_tile_read(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let geometry = RasterGeometry::complex_f32(2048, 512);
    let path = dir.path().join("tile.ent");

    let mut writer = OneraImageIO::create(&path, geometry, CodecConfig::default()).unwrap();
    writer.write_region(&geometry.full_region(), &generate_pixels(&geometry)).unwrap();
    writer.finish().unwrap();

    let mut reader = OneraImageIO::new(&path);
    reader.read_image_information().unwrap();
    c.bench_function("tile_read_64x64", |b| {
        b.iter(|| black_box(reader.read_region(&Region::new(200, 1000, 64, 64)).unwrap()));
    });
}

criterion_group!(benches, benchmark_full_write, benchmark_strip_read, benchmark_tile_read);
criterion_main!(benches);
