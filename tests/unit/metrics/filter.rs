use super::*;

#[test]
fn kernels_are_normalized() {
    let u = Kernel::uniform(7).unwrap();
    assert_eq!(u.len(), 7);
    assert_eq!(u.radius(), 3);
    assert!((u.weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);

    let g = Kernel::gaussian(11, 1.5).unwrap();
    assert_eq!(g.len(), 11);
    assert!((g.weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    assert!(g.weights[5] > g.weights[4]);
    assert!((g.weights[0] - g.weights[10]).abs() < 1e-15);
}

#[test]
fn kernel_rejects_bad_sizes_and_sigma() {
    assert!(Kernel::uniform(4).is_err());
    assert!(Kernel::uniform(1).is_err());
    assert!(Kernel::gaussian(7, 0.0).is_err());
    assert!(Kernel::gaussian(7, f64::NAN).is_err());
}

#[test]
fn reflect_mirrors_including_edge() {
    assert_eq!(reflect(-1, 5), 0);
    assert_eq!(reflect(-2, 5), 1);
    assert_eq!(reflect(5, 5), 4);
    assert_eq!(reflect(6, 5), 3);
    assert_eq!(reflect(2, 5), 2);
    // Windows wider than the plane keep folding.
    assert_eq!(reflect(-7, 3), 0);
    assert_eq!(reflect(9, 3), 2);
}

#[test]
fn constant_plane_is_fixed_point() {
    let (w, h) = (6usize, 4usize);
    let src = vec![42.0; w * h];
    let out = filter_plane(&src, w, h, &Kernel::gaussian(7, 1.5).unwrap());
    assert!(out.iter().all(|v| (v - 42.0).abs() < 1e-9));
}

#[test]
fn uniform_filter_averages_window() {
    let (w, h) = (5usize, 5usize);
    let mut src = vec![0.0; w * h];
    src[2 * w + 2] = 9.0;
    let out = filter_plane(&src, w, h, &Kernel::uniform(3).unwrap());
    assert!((out[2 * w + 2] - 1.0).abs() < 1e-12);
    assert!((out[w + 1] - 1.0).abs() < 1e-12);
    assert_eq!(out[0], 0.0);
}
