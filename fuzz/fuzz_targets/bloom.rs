#![no_main]

use approx_sets::bloom::BloomFilter;
use approx_sets::hash::{DoubleHashing, HashFamily, SaltedSha256, SeededWyHash};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    let size = 1 + usize::from(u16::from_le_bytes([data[0], data[1]]));
    let hasher: HashFamily = match data[2] % 3 {
        0 => SeededWyHash::default().into(),
        1 => DoubleHashing::default().into(),
        _ => SaltedSha256.into(),
    };
    let mut filter = BloomFilter::with_hasher(size, 1 + u32::from(data[2] % 8), hasher).unwrap();

    let text = String::from_utf8_lossy(&data[3..]);
    let items: Vec<&str> = text.split(',').collect();
    for item in &items {
        assert_eq!(filter.insert(*item), !item.is_empty());
        assert!(filter.bits_set() <= filter.size());
    }
    for item in items.iter().filter(|item| !item.is_empty()) {
        assert!(filter.contains(*item));
    }
});
