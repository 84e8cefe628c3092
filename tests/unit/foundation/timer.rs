use super::*;

#[test]
fn stop_freezes_elapsed() {
    let mut t = Timer::start();
    std::thread::sleep(Duration::from_millis(2));
    let first = t.stop();
    assert!(first >= Duration::from_millis(2));

    std::thread::sleep(Duration::from_millis(2));
    assert_eq!(t.elapsed(), first);
    assert_eq!(t.stop(), first);
}

#[test]
fn running_elapsed_is_monotonic() {
    let t = Timer::start();
    let a = t.elapsed();
    let b = t.elapsed();
    assert!(b >= a);
}

#[test]
fn timestamp_matches_format() {
    let ts = Timer::timestamp();
    assert!(chrono::NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT).is_ok());
}
