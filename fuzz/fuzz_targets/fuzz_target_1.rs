#![no_main]

use libfuzzer_sys::fuzz_target;
use skiplane::{SkipList, XorShift};
use std::collections::BTreeSet;

fuzz_target!(|data: &[u8]| {
    let mut list = SkipList::with_generator(XorShift::seeded(data.len() as u64));
    let mut model = BTreeSet::new();

    for op in data.chunks_exact(2) {
        let key = i64::from(op[1] as i8);

        match op[0] % 3 {
            0 => assert_eq!(list.insert(key).is_ok(), model.insert(key)),
            1 => assert_eq!(list.remove(key).is_ok(), model.remove(&key)),
            _ => assert_eq!(list.contains(key), model.contains(&key)),
        }
    }

    assert!(list.iter().map(|entry| entry.key()).eq(model.iter().copied()));
    assert_eq!(list.teardown(), model.len());
});
