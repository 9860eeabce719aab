use cell_counter::detector::annotate::{count_label, label_extent};
use cell_counter::detector::{DetectionError, DetectorConfig, ErrorKind, detect, trace};
use cell_counter::synthetic::{SlideSpec, SyntheticCell};
use image::{DynamicImage, Rgb, RgbImage};

fn grid_slide() -> SlideSpec {
    SlideSpec::grid(4, 3, 45, 30, 7.0)
}

fn pad_with(img: &RgbImage, color: Rgb<u8>) -> RgbImage {
    let mut out = RgbImage::from_pixel(img.width() + 2, img.height() + 2, color);
    for (x, y, px) in img.enumerate_pixels() {
        out.put_pixel(x + 1, y + 1, *px);
    }
    out
}

#[test]
fn counts_every_cell_on_a_grid() {
    let img = DynamicImage::ImageRgb8(grid_slide().render());
    let det = detect(&img, &DetectorConfig::default()).expect("detection failed");
    assert_eq!(det.count, 12);
    assert_eq!(det.regions.len(), 12);
    for region in &det.regions {
        assert!(region.area > 30.0 && region.area < 10_000.0);
    }
}

#[test]
fn tolerates_uneven_illumination() {
    let img = DynamicImage::ImageRgb8(grid_slide().with_gradient(40.0).render());
    let det = detect(&img, &DetectorConfig::default()).expect("detection failed");
    assert_eq!(det.count, 12);
}

#[test]
fn grayscale_input_is_accepted() {
    let img = DynamicImage::ImageRgb8(grid_slide().render()).grayscale();
    let det = detect(&img, &DetectorConfig::default()).expect("detection failed");
    assert_eq!(det.count, 12);
    assert_eq!(det.annotated.dimensions(), (img.width(), img.height()));
}

#[test]
fn detection_is_deterministic() {
    let img = DynamicImage::ImageRgb8(grid_slide().with_gradient(25.0).render());
    let config = DetectorConfig::default();
    let first = detect(&img, &config).expect("first run");
    let second = detect(&img, &config).expect("second run");
    assert_eq!(first.count, second.count);
    assert_eq!(first.annotated, second.annotated);
}

#[test]
fn input_image_is_not_modified() {
    let rgb = grid_slide().render();
    let img = DynamicImage::ImageRgb8(rgb.clone());
    let det = detect(&img, &DetectorConfig::default()).expect("detection failed");
    assert_eq!(img.to_rgb8(), rgb);
    assert_ne!(det.annotated, rgb);
}

#[test]
fn uniform_image_only_gains_the_label() {
    let background = Rgb([180, 170, 175]);
    let original = RgbImage::from_pixel(160, 90, background);
    let img = DynamicImage::ImageRgb8(original.clone());
    let config = DetectorConfig::default();
    let det = detect(&img, &config).expect("detection failed");
    assert_eq!(det.count, 0);
    assert!(det.regions.is_empty());

    let extent = label_extent(&count_label(0), &config).expect("label fits");
    let mut label_pixels = 0;
    for (x, y, px) in det.annotated.enumerate_pixels() {
        let in_label = (x as i32) >= extent.left()
            && (x as i32) <= extent.right()
            && (y as i32) >= extent.top()
            && (y as i32) <= extent.bottom();
        if in_label {
            if *px != background {
                label_pixels += 1;
            }
        } else {
            assert_eq!(px, original.get_pixel(x, y), "changed pixel at ({x}, {y})");
        }
    }
    assert!(label_pixels > 0, "label was not drawn");
}

#[test]
fn background_padding_keeps_the_count() {
    let spec = grid_slide();
    let rgb = spec.render();
    let padded = pad_with(&rgb, spec.background);
    let config = DetectorConfig::default();
    let plain = detect(&DynamicImage::ImageRgb8(rgb), &config).expect("plain");
    let framed = detect(&DynamicImage::ImageRgb8(padded), &config).expect("padded");
    assert_eq!(plain.count, framed.count);
}

#[test]
fn narrowing_the_band_drops_cells() {
    let img = DynamicImage::ImageRgb8(grid_slide().render());
    let tight = DetectorConfig {
        max_area: 50.0,
        ..DetectorConfig::default()
    };
    assert_eq!(detect(&img, &tight).expect("tight band").count, 0);

    let strict = DetectorConfig {
        min_area: 5_000.0,
        ..DetectorConfig::default()
    };
    assert_eq!(detect(&img, &strict).expect("strict band").count, 0);
}

#[test]
fn mixed_sizes_are_split_by_the_band() {
    let mut spec = SlideSpec::new(200, 80);
    for (i, radius) in [7.0, 7.0, 16.0, 16.0].into_iter().enumerate() {
        spec.cells.push(SyntheticCell {
            center: (30.0 + 45.0 * i as f32, 40.0),
            radius,
        });
    }
    let img = DynamicImage::ImageRgb8(spec.render());
    let all = detect(&img, &DetectorConfig::default()).expect("all");
    assert_eq!(all.count, 4);

    let small_only = DetectorConfig {
        max_area: 400.0,
        ..DetectorConfig::default()
    };
    assert_eq!(detect(&img, &small_only).expect("small").count, 2);
}

#[test]
fn trace_exposes_binary_masks() {
    let img = DynamicImage::ImageRgb8(grid_slide().render());
    let t = trace(&img, &DetectorConfig::default()).expect("trace failed");
    let (w, h) = (img.width(), img.height());
    for stage in [
        &t.stages.grayscale,
        &t.stages.smoothed,
        &t.stages.binary,
        &t.stages.cleaned,
    ] {
        assert_eq!(stage.dimensions(), (w, h));
    }
    assert!(t.stages.binary.pixels().all(|p| p[0] == 0 || p[0] == 255));
    assert!(t.stages.cleaned.pixels().all(|p| p[0] == 0 || p[0] == 255));
    assert_eq!(t.result.count, 12);
}

#[test]
fn empty_image_is_invalid() {
    let img = DynamicImage::new_rgb8(0, 0);
    let err = detect(&img, &DetectorConfig::default()).expect_err("zero-sized image must fail");
    assert!(matches!(err, DetectionError::InvalidImage(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidImage);

    let flat = DynamicImage::new_rgb8(12, 0);
    assert!(detect(&flat, &DetectorConfig::default()).is_err());
}

#[test]
fn bad_configuration_is_rejected_before_processing() {
    let img = DynamicImage::ImageRgb8(grid_slide().render());
    let config = DetectorConfig {
        min_area: 100.0,
        max_area: 100.0,
        ..DetectorConfig::default()
    };
    let err = detect(&img, &config).expect_err("inverted band must fail");
    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
}

#[test]
fn oversized_label_scale_is_a_configuration_error() {
    let img = DynamicImage::ImageRgb8(grid_slide().render());
    let config = DetectorConfig {
        label_scale: 1 << 30,
        ..DetectorConfig::default()
    };
    let err = detect(&img, &config).expect_err("label cannot fit");
    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
}
