use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use tally_core::{ExpenseId, MemberId, Money};
use tally_settlement::{Balances, ExpenseRecord, Split, compute_balances, compute_settlements};

/// Deterministic pseudo-random group: `members` people, `expenses` equal splits.
fn group(members: u64, expenses: u64) -> (Vec<MemberId>, Vec<ExpenseRecord>) {
    let roster: Vec<MemberId> = (1..=members).map(MemberId::new).collect();
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = || {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        seed
    };

    let records = (0..expenses)
        .map(|idx| {
            let payer = roster[(next() % members) as usize];
            let total = Money::from_cents((next() % 50_000 + 1) as i64);
            let split: Vec<MemberId> = roster
                .iter()
                .copied()
                .filter(|_| next() % 3 != 0)
                .collect();
            let split = if split.is_empty() { vec![payer] } else { split };
            ExpenseRecord::from_split(ExpenseId::new(idx), payer, total, Split::Equal(split))
                .unwrap()
        })
        .collect();

    (roster, records)
}

fn bench_compute_balances(c: &mut Criterion) {
    let mut group_bench = c.benchmark_group("compute_balances");

    for expenses in [10u64, 100, 1_000] {
        let (roster, records) = group(20, expenses);
        group_bench.throughput(Throughput::Elements(expenses));
        group_bench.bench_with_input(BenchmarkId::from_parameter(expenses), &records, |b, records| {
            b.iter(|| compute_balances(roster.iter().copied(), black_box(records)).unwrap());
        });
    }

    group_bench.finish();
}

fn bench_compute_settlements(c: &mut Criterion) {
    let mut group_bench = c.benchmark_group("compute_settlements");

    for members in [5u64, 50, 500] {
        let (roster, records) = group(members, members * 4);
        let balances: Balances = compute_balances(roster, &records).unwrap();
        group_bench.throughput(Throughput::Elements(members));
        group_bench.bench_with_input(BenchmarkId::from_parameter(members), &balances, |b, balances| {
            b.iter(|| compute_settlements(black_box(balances)).unwrap());
        });
    }

    group_bench.finish();
}

criterion_group!(benches, bench_compute_balances, bench_compute_settlements);
criterion_main!(benches);
