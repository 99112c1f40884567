use std::collections::BTreeSet;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crossbeam_skiplist::SkipSet;
use skiplane::{Geometric, SkipList};

const UPPER: usize = 1_000;

fn keys() -> Vec<i64> {
    let mut seed: u16 = 0x9e37;

    (0..UPPER)
        .map(|_| {
            seed ^= seed << 6;
            seed ^= seed >> 11;
            seed ^= seed << 5;
            i64::from(seed)
        })
        .collect()
}

fn insert(c: &mut Criterion) {
    let keys = keys();

    c.bench_function("skiplane insert", |b| {
        b.iter(|| {
            let mut list = SkipList::with_generator(Geometric::seeded(1));

            for key in &keys {
                let _ = list.insert(black_box(*key));
            }
        })
    });

    c.bench_function("crossbeam insert", |b| {
        b.iter(|| {
            let set = SkipSet::new();

            for key in &keys {
                set.insert(black_box(*key));
            }
        })
    });

    c.bench_function("btreeset insert", |b| {
        b.iter(|| {
            let mut set = BTreeSet::new();

            for key in &keys {
                set.insert(black_box(*key));
            }
        })
    });
}

fn get(c: &mut Criterion) {
    let keys = keys();
    let mut list = SkipList::with_generator(Geometric::seeded(1));
    list.extend(keys.iter().copied());
    let set: SkipSet<i64> = keys.iter().copied().collect();

    c.bench_function("skiplane get", |b| {
        b.iter(|| keys.iter().filter(|key| list.contains(black_box(**key))).count())
    });

    c.bench_function("crossbeam get", |b| {
        b.iter(|| keys.iter().filter(|key| set.contains(black_box(*key))).count())
    });
}

fn remove(c: &mut Criterion) {
    let keys = keys();

    c.bench_function("skiplane insert then remove", |b| {
        b.iter(|| {
            let mut list = SkipList::with_generator(Geometric::seeded(1));
            list.extend(keys.iter().copied());

            for key in &keys {
                let _ = list.remove(black_box(*key));
            }
        })
    });
}

criterion_group!(benches, insert, get, remove);
criterion_main!(benches);
