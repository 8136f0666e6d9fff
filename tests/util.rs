/// Check whether two floats differ by at most `tolerance`.
#[macro_export]
macro_rules! assert_floats_near_equal {
    ($val1:expr, $val2:expr, $tolerance:expr, $msg:expr) => {{
        let a: f64 = $val1;
        let b: f64 = $val2;
        assert!((a - b).abs() <= $tolerance, "{}: {} vs {}", $msg, a, b);
    }};
}

/// Route the crate's log output through the test harness. Safe to call from every test.
#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
