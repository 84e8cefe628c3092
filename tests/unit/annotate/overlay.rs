use super::*;

fn region(x: u32, y: u32, width: u32, height: u32) -> Region {
    Region {
        x,
        y,
        width,
        height,
    }
}

fn stroked(o: &Overlay) -> Vec<(u32, u32)> {
    o.as_image()
        .enumerate_pixels()
        .filter(|(_, _, p)| p.0[3] != 0)
        .map(|(x, y, _)| (x, y))
        .collect()
}

#[test]
fn no_regions_leaves_canvases_transparent() {
    let (a, b) = annotate(
        &[],
        Overlay::transparent(20, 10),
        Overlay::transparent(20, 10),
        &OverlayStyle::default(),
    )
    .unwrap();
    assert!(stroked(&a).is_empty());
    assert!(stroked(&b).is_empty());
    assert_eq!((a.width(), a.height()), (20, 10));
}

#[test]
fn one_pixel_stroke_traces_outline_only() {
    let style = OverlayStyle {
        stroke_width: 1,
        ..OverlayStyle::default()
    };
    let (a, b) = annotate(
        &[region(10, 10, 5, 5)],
        Overlay::transparent(30, 30),
        Overlay::transparent(30, 30),
        &style,
    )
    .unwrap();

    for (x, y) in [(10, 10), (15, 10), (10, 15), (15, 15), (12, 10), (10, 13)] {
        assert_eq!(a.pixel(x, y), style.color_a, "a at ({x},{y})");
        assert_eq!(b.pixel(x, y), style.color_b, "b at ({x},{y})");
    }
    assert!(a.is_transparent_at(12, 12));
    assert!(a.is_transparent_at(16, 16));
    assert!(a.is_transparent_at(9, 10));
    // 6x6 outline => 20 pixels.
    assert_eq!(stroked(&a).len(), 20);
    assert_eq!(stroked(&a), stroked(&b));
}

#[test]
fn thick_stroke_is_centered_and_single_colored() {
    let style = OverlayStyle::default();
    let (a, b) = annotate(
        &[region(20, 20, 16, 16)],
        Overlay::transparent(60, 60),
        Overlay::transparent(60, 60),
        &style,
    )
    .unwrap();

    // Stroke of 5 spans two pixels either side of the outline.
    assert_eq!(a.pixel(18, 28), style.color_a);
    assert_eq!(a.pixel(22, 28), style.color_a);
    assert!(a.is_transparent_at(17, 28));
    assert!(a.is_transparent_at(23, 28));
    assert_eq!(a.pixel(38, 28), style.color_a);
    assert!(a.is_transparent_at(39, 28));
    assert!(a.is_transparent_at(28, 28));

    for (x, y, p) in a.as_image().enumerate_pixels() {
        if p.0[3] != 0 {
            assert_eq!(p.0, style.color_a, "a at ({x},{y})");
        }
    }
    for (x, y, p) in b.as_image().enumerate_pixels() {
        if p.0[3] != 0 {
            assert_eq!(p.0, style.color_b, "b at ({x},{y})");
        }
    }
}

#[test]
fn strokes_clip_at_canvas_edges() {
    let (a, _) = annotate(
        &[region(0, 0, 3, 3), region(7, 7, 3, 3)],
        Overlay::transparent(10, 10),
        Overlay::transparent(10, 10),
        &OverlayStyle::default(),
    )
    .unwrap();
    assert!(!a.is_transparent_at(0, 0));
    assert!(!a.is_transparent_at(9, 9));
}

#[test]
fn style_validation() {
    assert!(OverlayStyle::default().validate().is_ok());
    let same = OverlayStyle {
        color_b: OverlayStyle::default().color_a,
        ..OverlayStyle::default()
    };
    assert!(same.validate().is_err());
    let zero = OverlayStyle {
        stroke_width: 0,
        ..OverlayStyle::default()
    };
    assert!(zero.validate().is_err());
    let translucent = OverlayStyle {
        color_a: [255, 0, 0, 128],
        ..OverlayStyle::default()
    };
    assert!(translucent.validate().is_err());
    assert!(
        annotate(
            &[],
            Overlay::transparent(1, 1),
            Overlay::transparent(1, 1),
            &same
        )
        .is_err()
    );
}
