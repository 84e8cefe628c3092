use super::*;

fn gradient(w: u32, h: u32) -> GrayImage {
    GrayImage::from_fn(w, h, |x, y| Luma([((x * 7 + y * 3) % 256) as u8]))
}

#[test]
fn identical_images_score_one() {
    let img = gradient(40, 30);
    for window in [
        SsimWindow::Uniform { size: 7 },
        SsimWindow::Gaussian {
            size: 11,
            sigma: 1.5,
        },
    ] {
        let params = SsimParams {
            window,
            ..SsimParams::default()
        };
        let r = score_and_diff(&img, &img, &params).unwrap();
        assert!((r.score - 1.0).abs() < 1e-6, "score {}", r.score);
        assert!(r.diff.values().iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }
}

#[test]
fn map_has_input_shape() {
    let a = gradient(13, 9);
    let b = GrayImage::from_pixel(13, 9, Luma([128]));
    let r = score_and_diff(&a, &b, &SsimParams::default()).unwrap();
    assert_eq!(r.diff.width(), 13);
    assert_eq!(r.diff.height(), 9);
    assert_eq!(r.diff.values().len(), 13 * 9);
    assert!(r.score < 1.0);
    assert!(r.score >= -1.0);
}

#[test]
fn tiny_images_still_score() {
    let a = GrayImage::from_pixel(2, 2, Luma([10]));
    let r = score_and_diff(&a, &a, &SsimParams::default()).unwrap();
    assert!((r.score - 1.0).abs() < 1e-6);
}

#[test]
fn shape_mismatch_is_an_error() {
    let a = GrayImage::new(10, 10);
    let b = GrayImage::new(10, 11);
    let err = score_and_diff(&a, &b, &SsimParams::default()).unwrap_err();
    assert!(matches!(err, PageDiffError::ShapeMismatch { .. }));
}

#[test]
fn local_patch_lowers_similarity_only_nearby() {
    let a = GrayImage::from_pixel(100, 100, Luma([255]));
    let mut b = a.clone();
    for y in 40..50 {
        for x in 40..50 {
            b.put_pixel(x, y, Luma([0]));
        }
    }
    let r = score_and_diff(&a, &b, &SsimParams::default()).unwrap();
    assert!(r.score < 1.0);
    assert!(r.diff.get(45, 45) < 0.1);
    // Beyond the 7x7 window radius the page is untouched.
    assert!((r.diff.get(10, 10) - 1.0).abs() < 1e-6);
    assert!((r.diff.get(53, 45) - 1.0).abs() < 1e-6);
    assert!(r.diff.get(52, 45) < 1.0);
}

#[test]
fn diff_images_are_complementary() {
    let map = DiffMap::from_values(2, 1, vec![1.0, 0.0]).unwrap();
    assert_eq!(map.to_similarity_image().as_raw(), &vec![255, 0]);
    assert_eq!(map.to_dissimilarity_image().as_raw(), &vec![0, 255]);
}

#[test]
fn diff_map_clamps_and_checks_len() {
    let map = DiffMap::from_values(3, 1, vec![-0.5, 1.5, f32::NAN]).unwrap();
    assert_eq!(map.values(), &[0.0, 1.0, 0.0]);
    assert!(DiffMap::from_values(2, 2, vec![0.0; 3]).is_err());
}

#[test]
fn window_serde_is_tagged() {
    let w: SsimWindow = serde_json::from_str(r#"{"kind":"gaussian","size":11,"sigma":1.5}"#).unwrap();
    assert_eq!(
        w,
        SsimWindow::Gaussian {
            size: 11,
            sigma: 1.5
        }
    );
    assert_eq!(w.size(), 11);
    assert_eq!(SsimWindow::default(), SsimWindow::Uniform { size: 7 });
}
