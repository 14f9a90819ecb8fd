use std::fs;
use std::ops::ControlFlow;
use std::path::PathBuf;

use mandelia_core::{FractalKind, Mandelbrot, Viewport};
use mandelia_render::{
    compute, ExportFormat, ExportSpec, FractaleManager, ModuloColoration, RenderError,
};

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("temp dir");
    dir
}

fn small_spec(format: ExportFormat) -> ExportSpec {
    ExportSpec {
        width: 24,
        height: 16,
        fps: 4,
        speed: 20,
        format,
        quality: 80,
    }
}

#[test]
fn end_to_end_mandelbrot_render() {
    let mandelbrot = Mandelbrot::default();
    let viewport = Viewport::default_mandelbrot(200, 150);
    let result = compute(&mandelbrot, &viewport);

    assert_eq!(result.iterations.data.len(), 200 * 150);
    assert!(result.tiles_rendered > 0);

    let buffer = ModuloColoration::default().colorize(&result.iterations);
    assert!(
        buffer.pixels.chunks_exact(3).any(|px| px != [0, 0, 0]),
        "rendered image should contain non-black pixels"
    );
    assert!(
        buffer.pixels.chunks_exact(3).any(|px| px == [0, 0, 0]),
        "the set itself is black"
    );
}

#[test]
fn images_have_requested_size() {
    let mut m = FractaleManager::new(256, 128).unwrap();
    let (first, second) = m.images();
    assert_eq!((first.width, first.height), (256, 128));
    assert_eq!(first.pixels.len(), 256 * 128 * 3);
    assert_eq!((second.width, second.height), (85, 42));
}

#[test]
fn zoom_then_unzoom_restores_view() {
    let mut m = FractaleManager::new(300, 200).unwrap();
    let before = *m.first().viewport();
    m.zoom(73.0, 41.0, 2.5).unwrap();
    assert!(m.pixel_size() < before.pixel_size());
    m.zoom(73.0, 41.0, 1.0 / 2.5).unwrap();
    let after = *m.first().viewport();
    for (a, b) in [
        (after.top_left.re, before.top_left.re),
        (after.top_left.im, before.top_left.im),
        (after.bottom_right.re, before.bottom_right.re),
        (after.bottom_right.im, before.bottom_right.im),
    ] {
        assert!((a - b).abs() < 1e-12, "{a} vs {b}");
    }
}

#[test]
fn swap_twice_is_identity() {
    let mut m = FractaleManager::new(120, 90).unwrap();
    m.zoom(10.0, 10.0, 2.0).unwrap();
    m.motion(30.0, 20.0);
    let bytes = m.to_bytes();
    let sizes = (
        (m.first().width(), m.first().height()),
        (m.second().width(), m.second().height()),
    );

    m.swap().unwrap();
    assert_eq!(m.first_kind(), FractalKind::Julia);
    m.swap().unwrap();

    assert!(m.is_mandelbrot_first());
    assert_eq!(
        (
            (m.first().width(), m.first().height()),
            (m.second().width(), m.second().height()),
        ),
        sizes
    );
    let restored = m.to_bytes();
    assert_eq!(restored[0], bytes[0]);
    assert_eq!(restored.len(), bytes.len());
}

#[test]
fn resize_round_trip_restores_view() {
    let mut m = FractaleManager::new(300, 200).unwrap();
    m.zoom(100.0, 50.0, 3.0).unwrap();
    let before = *m.first().viewport();
    m.resize(640, 480).unwrap();
    assert_eq!((m.first().width(), m.first().height()), (640, 480));
    assert_eq!((m.second().width(), m.second().height()), (213, 160));
    m.resize(300, 200).unwrap();
    let after = *m.first().viewport();
    assert!((after.top_left.re - before.top_left.re).abs() < 1e-12);
    assert!((after.bottom_right.im - before.bottom_right.im).abs() < 1e-12);
    assert!((m.pixel_size() - before.pixel_size()).abs() < 1e-15);
}

#[test]
fn iterations_propagate_to_both_surfaces() {
    let mut m = FractaleManager::new(60, 60).unwrap();
    m.set_iterations(64).unwrap();
    m.swap().unwrap();
    assert_eq!(m.iterations(), 64);
    assert_eq!(m.second().iterations(), 64);

    let mut m = FractaleManager::new(60, 60).unwrap();
    m.set_iterations(64).unwrap();
    let (a, b) = (m.iter_sum(), m.iter_pixel());
    assert!(a > 0);
    assert!((b - a as f64 / 3600.0).abs() < 1e-9);
}

#[test]
fn counts_within_budget_for_both_kinds() {
    let mut m = FractaleManager::new(90, 60).unwrap();
    m.set_iterations(50).unwrap();
    let _ = m.images();
    assert!(m.iter_sum() <= 50 * 90 * 60);
    m.swap().unwrap();
    assert!(m.iter_pixel() <= 50.0);
}

#[test]
fn state_file_round_trip() {
    let dir = temp_dir("mandelia_it_state");
    let path = dir.join("view.mbc");

    let mut m = FractaleManager::new(200, 100).unwrap();
    m.zoom(40.0, 70.0, 4.0).unwrap();
    m.motion(120.0, 30.0);
    m.set_iterations(1000).unwrap();
    m.swap().unwrap();
    m.save(&path).unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len(), 89);

    let mut other = FractaleManager::new(200, 100).unwrap();
    other.load(&path).unwrap();
    assert!(!other.is_mandelbrot_first());
    assert_eq!(other.to_bytes(), m.to_bytes());
    assert_eq!(other.julia().c(), m.julia().c());
    assert_eq!(other.iterations(), 1000);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn short_file_leaves_state_unchanged() {
    let dir = temp_dir("mandelia_it_short");
    let path = dir.join("short.mbc");
    fs::write(&path, [1u8; 40]).unwrap();

    let mut m = FractaleManager::new(100, 100).unwrap();
    m.zoom(20.0, 20.0, 2.0).unwrap();
    let before = m.to_bytes();
    assert!(matches!(m.load(&path), Err(RenderError::Core(_))));
    assert_eq!(m.to_bytes(), before);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn cancelled_animation_restores_state() {
    let mut m = FractaleManager::new(90, 60).unwrap();
    m.set_iterations(40).unwrap();
    m.zoom(45.0, 30.0, 30.0).unwrap();
    let before = m.to_bytes();

    let mut frames = 0;
    let result = m.drop_animation(&small_spec(ExportFormat::Gif), |_, _| {
        frames += 1;
        if frames == 3 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    assert!(matches!(result, Err(RenderError::Cancelled)));
    assert_eq!(frames, 3);
    assert_eq!(m.to_bytes(), before);
    assert_eq!((m.first().width(), m.first().height()), (90, 60));
}

#[test]
fn completed_animation_ends_at_current_zoom() {
    let mut m = FractaleManager::new(90, 60).unwrap();
    m.set_iterations(40).unwrap();
    m.zoom(45.0, 30.0, 10.0).unwrap();
    let before = m.to_bytes();

    let mut last = 0.0;
    let frames = m
        .drop_animation(&small_spec(ExportFormat::Gif), |progress, frame| {
            assert!(progress >= last);
            assert_eq!((frame.image.width, frame.image.height), (24, 16));
            last = progress;
            ControlFlow::Continue(())
        })
        .unwrap();
    assert!(frames > 1);
    assert!((last - 1.0).abs() < 1e-9);
    assert_eq!(m.to_bytes(), before);
}

#[test]
fn larger_export_stops_at_requested_pixel_size() {
    let mut m = FractaleManager::new(300, 200).unwrap();
    m.set_iterations(30).unwrap();
    m.zoom(150.0, 100.0, 8.0).unwrap();
    let requested = m.pixel_size();

    let spec = ExportSpec {
        width: 600,
        height: 400,
        ..small_spec(ExportFormat::Gif)
    };
    let start = Viewport::default_mandelbrot(600, 400).pixel_size();
    let expected = ((start / requested).ln() / spec.zoom_multiplier().ln()).ceil() as usize + 1;

    let mut progress = Vec::new();
    let frames = m
        .drop_animation(&spec, |p, _| {
            progress.push(p);
            ControlFlow::Continue(())
        })
        .unwrap();
    assert_eq!(frames, expected);
    assert!((progress[frames - 1] - 1.0).abs() < 1e-9);
    assert!(progress[frames - 2] < 1.0);
    assert_eq!(m.pixel_size(), requested);
}

#[test]
fn gif_export_writes_animation() {
    let dir = temp_dir("mandelia_it_gif");
    let path = dir.join("zoom.gif");

    let mut m = FractaleManager::new(90, 60).unwrap();
    m.set_iterations(30).unwrap();
    m.zoom(45.0, 30.0, 4.0).unwrap();
    let summary = m
        .export(&small_spec(ExportFormat::Gif), &path, |_, _| {
            ControlFlow::Continue(())
        })
        .unwrap();
    assert_eq!(summary.format, ExportFormat::Gif);
    assert!(summary.frames > 1);

    let header = fs::read(&path).unwrap();
    assert_eq!(&header[..6], b"GIF89a");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn cancelled_gif_export_removes_file() {
    let dir = temp_dir("mandelia_it_gif_cancel");
    let path = dir.join("zoom.gif");

    let mut m = FractaleManager::new(90, 60).unwrap();
    m.zoom(45.0, 30.0, 4.0).unwrap();
    let result = m.export(&small_spec(ExportFormat::Gif), &path, |_, _| {
        ControlFlow::Break(())
    });
    assert!(matches!(result, Err(RenderError::Cancelled)));
    assert!(!path.exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn still_export_uses_requested_size() {
    let dir = temp_dir("mandelia_it_still");
    let png_path = dir.join("still.png");
    let jpg_path = dir.join("still.jpg");

    let mut m = FractaleManager::new(90, 60).unwrap();
    let before = m.to_bytes();
    m.export(&small_spec(ExportFormat::Png), &png_path, |_, _| {
        ControlFlow::Continue(())
    })
    .unwrap();
    m.export(&small_spec(ExportFormat::Jpeg), &jpg_path, |_, _| {
        ControlFlow::Continue(())
    })
    .unwrap();

    let png = image::open(&png_path).unwrap();
    assert_eq!((png.width(), png.height()), (24, 16));
    let jpg = image::open(&jpg_path).unwrap();
    assert_eq!((jpg.width(), jpg.height()), (24, 16));
    assert_eq!(m.to_bytes(), before);
    assert_eq!((m.first().width(), m.first().height()), (90, 60));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn invalid_export_spec_is_rejected() {
    let mut m = FractaleManager::new(30, 30).unwrap();
    let spec = ExportSpec {
        fps: 0,
        ..small_spec(ExportFormat::Gif)
    };
    assert!(matches!(
        m.zoom_animation(&spec).err(),
        Some(RenderError::InvalidExport { .. })
    ));
}
