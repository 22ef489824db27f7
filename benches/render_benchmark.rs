use criterion::{Criterion, criterion_group, criterion_main};
use image::{Rgba, RgbaImage};
use std::hint::black_box;
use terracube::objects::texture::TextureUrl;
use terracube::render::Renderer;
use terracube::render::z_buffer::ZBufferPerformer;
use terracube::scene::{Scene, Shape};

const WIDTH: u32 = 400;
const HEIGHT: u32 = 300;

fn checkerboard() -> TextureUrl {
    let image = RgbaImage::from_fn(512, 512, |x, y| {
        if (x / 32 + y / 32) % 2 == 0 {
            Rgba([30, 120, 60, 255])
        } else {
            Rgba([200, 190, 170, 255])
        }
    });
    TextureUrl::encode_png(&image).unwrap()
}

fn render_benchmark(c: &mut Criterion) {
    let texture = checkerboard();
    let mut group = c.benchmark_group("render");

    for shape in Shape::ALL {
        for (label, url) in [("flat", None), ("textured", Some(&texture))] {
            let scene = Scene::create(url, shape, WIDTH as f64 / HEIGHT as f64);
            let mut renderer = ZBufferPerformer::new(WIDTH, HEIGHT);
            let mut frame = image::RgbImage::new(WIDTH, HEIGHT);

            group.bench_function(format!("{shape}/{label}"), |b| {
                b.iter(|| renderer.create_frame_mut(black_box(&mut frame), black_box(&scene)))
            });
        }
    }
    group.finish();
}

fn scene_setup_benchmark(c: &mut Criterion) {
    let texture = checkerboard();
    c.bench_function("scene/create_textured_sphere", |b| {
        b.iter(|| Scene::create(black_box(Some(&texture)), Shape::Sphere, 4.0 / 3.0))
    });
}

criterion_group!(benches, render_benchmark, scene_setup_benchmark);
criterion_main!(benches);
