use approx_sets::bloom::BloomFilter;
use approx_sets::dedup::check_uniqueness;
use approx_sets::observer::TracingObserver;

fn main() {
    tracing_subscriber::fmt().with_env_filter("debug").init();

    let mut filter = BloomFilter::new(1000, 3)
        .unwrap()
        .with_observer(TracingObserver);
    for used in ["password123", "admin123", "qwerty123"] {
        filter.insert(used);
    }

    let candidates = ["password123", "newpassword", "admin123", "guest"];
    for (password, verdict) in check_uniqueness(&mut filter, candidates) {
        println!("Password '{}' - {}.", password.unwrap_or_default(), verdict);
    }
    println!("{:?}, estimated fpp = {:.6}", filter, filter.estimated_fpp());
}
