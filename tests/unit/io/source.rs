use super::*;

#[test]
fn probe_reads_header_and_orientation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page__pg_01.png");
    image::RgbImage::new(30, 20).save(&path).unwrap();

    let src = FsImageSource;
    assert!(src.exists(&path));
    let info = src.probe(&path).unwrap();
    assert_eq!(info.dimensions(), (30, 20));
    assert_eq!(info.orientation(), Orientation::Landscape);
    assert_eq!(info.format, Some(image::ImageFormat::Png));
    assert_eq!(info.path, path);

    let img = src.decode(&path).unwrap();
    assert_eq!((img.width(), img.height()), (30, 20));
}

#[test]
fn format_is_sniffed_from_contents() {
    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("real.png");
    image::GrayImage::new(4, 8).save(&png).unwrap();
    let misnamed = dir.path().join("misnamed.jpg");
    std::fs::copy(&png, &misnamed).unwrap();

    let info = FsImageSource.probe(&misnamed).unwrap();
    assert_eq!(info.format, Some(image::ImageFormat::Png));
    assert_eq!(info.orientation(), Orientation::Portrait);
}

#[test]
fn garbage_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.jpg");
    std::fs::write(&path, b"definitely not an image").unwrap();

    let err = FsImageSource.probe(&path).unwrap_err();
    assert!(matches!(err, PageDiffError::UnreadableImage { .. }));
    let err = FsImageSource.decode(&path).unwrap_err();
    assert!(err.to_string().contains("broken.jpg"));
}

#[test]
fn missing_file_does_not_exist() {
    let dir = tempfile::tempdir().unwrap();
    assert!(!FsImageSource.exists(&dir.path().join("nope.png")));
    assert!(!FsImageSource.exists(dir.path()));
}
