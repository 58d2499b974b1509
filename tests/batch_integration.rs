use image::{ImageBuffer, ImageFormat, ImageReader, Rgb, Rgba};
use rakkan::watermark::ProcessError;
use rakkan::{BatchRequest, Position, WatermarkError, batch_watermark, run_batch};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tempfile::TempDir;

struct Workspace {
    _temp_dir: TempDir,
    root: PathBuf,
    out: PathBuf,
    logo: PathBuf,
}

/// Temp dir with an `out/` folder and a 32x32 semi-transparent `logo.png`.
fn create_workspace() -> Workspace {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    let out = root.join("out");
    std::fs::create_dir(&out).unwrap();

    let logo = root.join("logo.png");
    ImageBuffer::from_pixel(32, 32, Rgba([255u8, 255, 255, 180]))
        .save(&logo)
        .unwrap();

    Workspace {
        _temp_dir: temp_dir,
        root,
        out,
        logo,
    }
}

fn write_png(path: &Path) {
    ImageBuffer::from_pixel(160, 120, Rgba([20u8, 90, 200, 255]))
        .save(path)
        .unwrap();
}

fn write_jpeg(path: &Path) {
    ImageBuffer::from_pixel(160, 120, Rgb([200u8, 150, 20]))
        .save(path)
        .unwrap();
}

fn output_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_end_to_end_png_and_jpeg() {
    let ws = create_workspace();
    let a = ws.root.join("a.png");
    let b = ws.root.join("b.jpg");
    write_png(&a);
    write_jpeg(&b);

    let count = batch_watermark(&[a, b], &ws.logo, &ws.out, "Center", 95).unwrap();

    assert_eq!(count, 2);
    assert_eq!(
        output_names(&ws.out),
        vec!["a_watermarked.png", "b_watermarked.jpg"]
    );

    let png = image::open(ws.out.join("a_watermarked.png")).unwrap();
    assert!(png.color().has_alpha());

    let jpeg_reader = ImageReader::open(ws.out.join("b_watermarked.jpg"))
        .unwrap()
        .with_guessed_format()
        .unwrap();
    assert_eq!(jpeg_reader.format(), Some(image::ImageFormat::Jpeg));
    assert!(!jpeg_reader.decode().unwrap().color().has_alpha());
}

#[test]
fn test_corrupt_middle_image_does_not_stop_the_batch() {
    let ws = create_workspace();
    let first = ws.root.join("first.png");
    let broken = ws.root.join("broken.jpg");
    let third = ws.root.join("third.png");
    write_png(&first);
    std::fs::write(&broken, b"\xFF\xD8\xFF garbage that is not a jpeg").unwrap();
    write_png(&third);

    let request = BatchRequest::new(
        vec![first.clone(), broken.clone(), third.clone()],
        &ws.logo,
        &ws.out,
        Position::BottomLeft,
    );
    let outcome = run_batch(&request).unwrap();

    assert_eq!(outcome.total, 3);
    assert_eq!(outcome.attempted, 3);
    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].path, broken);
    assert!(matches!(outcome.failures[0].reason, ProcessError::Image(_)));
    assert_eq!(
        outcome.outputs,
        vec![
            ws.out.join("first_watermarked.png"),
            ws.out.join("third_watermarked.png"),
        ]
    );
    assert!(!outcome.is_complete_success());

    // Same behaviour through the function contract
    let count = batch_watermark(&[first, broken, third], &ws.logo, &ws.out, "Top-Left", 95)
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn test_missing_watermark_is_fatal_and_writes_nothing() {
    let ws = create_workspace();
    let a = ws.root.join("a.png");
    write_png(&a);
    let missing = ws.root.join("no-logo.png");

    let err = batch_watermark(&[a.clone(), a], &missing, &ws.out, "Center", 95).unwrap_err();

    match err {
        WatermarkError::MissingFile(path) => assert_eq!(path, missing),
        other => panic!("unexpected error: {}", other),
    }
    assert!(output_names(&ws.out).is_empty());
}

#[test]
fn test_undecodable_watermark_is_fatal_and_writes_nothing() {
    let ws = create_workspace();
    let a = ws.root.join("a.png");
    write_png(&a);
    let bad_logo = ws.root.join("bad-logo.png");
    std::fs::write(&bad_logo, b"definitely not an image").unwrap();

    let err = batch_watermark(&[a], &bad_logo, &ws.out, "Center", 95).unwrap_err();

    assert!(matches!(err, WatermarkError::WatermarkLoad { .. }));
    assert!(err.to_string().contains("bad-logo.png"));
    assert!(std::error::Error::source(&err).is_some());
    assert!(output_names(&ws.out).is_empty());
}

#[test]
fn test_watermark_format_comes_from_content_not_extension() {
    let ws = create_workspace();
    let a = ws.root.join("a.png");
    write_png(&a);

    let logo = ImageBuffer::from_pixel(32, 32, Rgba([255u8, 255, 255, 180]));
    for name in ["logo.jpg", "logo", "logo.wm"] {
        let path = ws.root.join(name);
        logo.save_with_format(&path, ImageFormat::Png).unwrap();

        let count = batch_watermark(std::slice::from_ref(&a), &path, &ws.out, "Center", 95)
            .unwrap_or_else(|e| panic!("watermark {} failed to load: {}", name, e));
        assert_eq!(count, 1, "watermark {}", name);
    }

    assert_eq!(
        output_names(&ws.out),
        vec![
            "a_watermarked(1).png",
            "a_watermarked(2).png",
            "a_watermarked.png"
        ]
    );
}

#[test]
fn test_empty_batch_returns_zero() {
    let ws = create_workspace();

    let count = batch_watermark(&[], &ws.logo, &ws.out, "Center", 95).unwrap();

    assert_eq!(count, 0);
    assert!(output_names(&ws.out).is_empty());
}

#[test]
fn test_same_stem_from_different_folders() {
    let ws = create_workspace();
    std::fs::create_dir(ws.root.join("day1")).unwrap();
    std::fs::create_dir(ws.root.join("day2")).unwrap();
    let first = ws.root.join("day1").join("IMG_0001.png");
    let second = ws.root.join("day2").join("IMG_0001.png");
    write_png(&first);
    write_png(&second);

    let count = batch_watermark(&[first, second], &ws.logo, &ws.out, "Center", 95).unwrap();

    assert_eq!(count, 2);
    assert_eq!(
        output_names(&ws.out),
        vec!["IMG_0001_watermarked(1).png", "IMG_0001_watermarked.png"]
    );
}

#[test]
fn test_rerun_into_same_folder_keeps_earlier_results() {
    let ws = create_workspace();
    let a = ws.root.join("a.png");
    write_png(&a);

    batch_watermark(std::slice::from_ref(&a), &ws.logo, &ws.out, "Center", 95).unwrap();
    let first_run = std::fs::read(ws.out.join("a_watermarked.png")).unwrap();
    batch_watermark(&[a], &ws.logo, &ws.out, "Center", 95).unwrap();

    assert_eq!(
        output_names(&ws.out),
        vec!["a_watermarked(1).png", "a_watermarked.png"]
    );
    assert_eq!(
        std::fs::read(ws.out.join("a_watermarked.png")).unwrap(),
        first_run
    );
}

#[test]
fn test_unknown_position_behaves_like_bottom_right() {
    let ws = create_workspace();
    let a = ws.root.join("a.png");
    write_png(&a);

    batch_watermark(std::slice::from_ref(&a), &ws.logo, &ws.out, "Somewhere", 95).unwrap();
    batch_watermark(&[a], &ws.logo, &ws.out, "Bottom-Right", 95).unwrap();

    let unknown = image::open(ws.out.join("a_watermarked.png")).unwrap();
    let bottom_right = image::open(ws.out.join("a_watermarked(1).png")).unwrap();
    assert_eq!(unknown.to_rgba8(), bottom_right.to_rgba8());
}

#[test]
fn test_cancelled_batch_attempts_nothing() {
    let ws = create_workspace();
    let a = ws.root.join("a.png");
    write_png(&a);

    let request = BatchRequest::new(vec![a], &ws.logo, &ws.out, Position::Center)
        .with_cancel_flag(Arc::new(AtomicBool::new(true)));
    let outcome = run_batch(&request).unwrap();

    assert!(outcome.cancelled);
    assert_eq!(outcome.attempted, 0);
    assert_eq!(outcome.succeeded, 0);
    assert!(output_names(&ws.out).is_empty());
}

#[test]
fn test_quality_is_clamped() {
    let request = BatchRequest::new(Vec::new(), "logo.png", "out", Position::Center);
    assert_eq!(request.quality, 95);
    assert_eq!(request.clone().with_quality(0).quality, 1);
    assert_eq!(request.with_quality(250).quality, 100);
}

#[test]
fn test_summary_serializes_failures() {
    let ws = create_workspace();
    let missing = ws.root.join("ghost.png");

    let request = BatchRequest::new(vec![missing], &ws.logo, &ws.out, Position::Center);
    let outcome = run_batch(&request).unwrap();
    let json = serde_json::to_value(outcome.summary()).unwrap();

    assert_eq!(json["total"], 1);
    assert_eq!(json["succeeded"], 0);
    assert_eq!(json["failed"], 1);
    assert_eq!(json["cancelled"], false);
    assert!(
        json["failures"][0]["path"]
            .as_str()
            .unwrap()
            .ends_with("ghost.png")
    );
}
