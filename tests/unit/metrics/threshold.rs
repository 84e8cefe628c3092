use image::Luma;

use super::*;

fn image_of(values: &[(u8, u32)]) -> GrayImage {
    let pixels: Vec<u8> = values
        .iter()
        .flat_map(|&(v, c)| std::iter::repeat_n(v, c as usize))
        .collect();
    GrayImage::from_raw(pixels.len() as u32, 1, pixels).unwrap()
}

#[test]
fn otsu_splits_bimodal_intensities() {
    let img = image_of(&[(20, 100), (22, 50), (200, 80), (210, 40)]);
    let out = binarize_intensity(&img);
    assert!((22..200).contains(&out.threshold), "level {}", out.threshold);
    assert_eq!(out.mask.foreground_count(), 120);
}

#[test]
fn single_intensity_uses_level_zero() {
    for img in [image_of(&[(0, 10)]), image_of(&[(255, 10)])] {
        assert_eq!(binarize_intensity(&img).threshold, 0);
    }
    assert_eq!(binarize_intensity(&image_of(&[(0, 10), (255, 3)])).threshold, 0);
}

#[test]
fn binarize_flags_bright_pixels() {
    let img = GrayImage::from_fn(4, 1, |x, _| Luma([[0, 10, 240, 250][x as usize]]));
    let out = binarize_intensity(&img);
    assert!(!out.mask.is_foreground(0, 0));
    assert!(!out.mask.is_foreground(1, 0));
    assert!(out.mask.is_foreground(2, 0));
    assert!(out.mask.is_foreground(3, 0));
    assert_eq!(out.mask.foreground_count(), 2);
}

#[test]
fn binarize_is_idempotent_on_masks() {
    let img = GrayImage::from_fn(20, 10, |x, y| {
        if (x + y) % 3 == 0 {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    });
    let first = binarize_intensity(&img);
    assert_eq!(first.mask.as_image(), &img);
    let second = binarize_intensity(first.mask.as_image());
    assert_eq!(second.mask, first.mask);

    let all_bg = GrayImage::new(5, 5);
    assert_eq!(binarize_intensity(&all_bg).mask.as_image(), &all_bg);
    let all_fg = GrayImage::from_pixel(5, 5, Luma([FOREGROUND]));
    assert_eq!(binarize_intensity(&all_fg).mask.as_image(), &all_fg);
}

#[test]
fn identical_map_yields_empty_mask() {
    let map = DiffMap::from_values(8, 8, vec![1.0; 64]).unwrap();
    let out = binarize(&map);
    assert_eq!(out.mask.foreground_count(), 0);
}

#[test]
fn dissimilar_patch_becomes_foreground() {
    let mut values = vec![1.0f32; 100];
    for y in 3..6 {
        for x in 3..6 {
            values[y * 10 + x] = 0.05;
        }
    }
    let map = DiffMap::from_values(10, 10, values).unwrap();
    let out = binarize(&map);
    assert_eq!(out.mask.foreground_count(), 9);
    assert!(out.mask.is_foreground(4, 4));
    assert!(!out.mask.is_foreground(0, 0));
}
