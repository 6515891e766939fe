use core::hint::black_box;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rangesplit::{
    Handler, QueryContext, Response, Result, SplitByInterval, SplitConfig, StaticLimits,
    TimeQuery, split_by_time,
};
use std::time::{Duration, Instant, UNIX_EPOCH};
use tokio::runtime::Builder;

const DAY: u64 = 24 * 60 * 60;

struct Count(u64);

impl Response for Count {
    fn entry_count(&self) -> u64 {
        self.0
    }
}

/// Answers every sub-range immediately with a single entry.
struct Instant1;

impl Handler for Instant1 {
    type Response = Count;

    async fn handle(&self, _ctx: &QueryContext, _query: TimeQuery) -> Result<Count> {
        Ok(Count(1))
    }
}

fn sum(responses: Vec<Count>) -> Result<Count> {
    Ok(Count(responses.iter().map(|c| c.0).sum()))
}

fn day_query(limit: u32) -> TimeQuery {
    TimeQuery::new("{job=\"bench\"}", UNIX_EPOCH, UNIX_EPOCH + Duration::from_secs(DAY))
        .with_limit(limit)
}

/// Cost of slicing one day into sub-ranges of decreasing size.
fn bench_split_by_time(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_by_time");
    let query = day_query(1_000);

    for interval_secs in [3_600_u64, 300, 60] {
        let intervals = DAY / interval_secs;
        group.throughput(Throughput::Elements(intervals));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{intervals}_intervals")),
            &Duration::from_secs(interval_secs),
            |b, interval| b.iter(|| black_box(split_by_time(black_box(&query), *interval))),
        );
    }

    group.finish();
}

/// End-to-end split query over one day of 5 minute sub-ranges with a
/// no-op downstream, at several parallelism levels.
fn bench_split_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_query");
    group.throughput(Throughput::Elements(DAY / 300));

    for parallelism in [1_usize, 4, 16, 64] {
        group.bench_function(format!("parallelism/{parallelism}"), |b| {
            let rt = Builder::new_multi_thread()
                .enable_all()
                .worker_threads(4)
                .build()
                .unwrap();

            let split = SplitByInterval::new(
                Instant1,
                StaticLimits::new(parallelism),
                sum as fn(Vec<Count>) -> Result<Count>,
                SplitConfig::new(Duration::from_secs(300)).unwrap(),
            );
            let ctx = QueryContext::new().with_org_id("bench");

            b.to_async(&rt).iter_custom(|iters| {
                let split = &split;
                let ctx = &ctx;
                async move {
                    let start = Instant::now();
                    for _ in 0..iters {
                        let merged = split.handle(ctx, day_query(u32::MAX)).await.unwrap();
                        black_box(merged.0);
                    }
                    start.elapsed()
                }
            });
        });
    }

    group.finish();
}

/// A limit met by the first few sub-ranges cancels the rest.
fn bench_early_exit(c: &mut Criterion) {
    let mut group = c.benchmark_group("early_exit");

    group.bench_function("limit/8", |b| {
        let rt = Builder::new_multi_thread()
            .enable_all()
            .worker_threads(4)
            .build()
            .unwrap();

        let split = SplitByInterval::new(
            Instant1,
            StaticLimits::new(16),
            sum as fn(Vec<Count>) -> Result<Count>,
            SplitConfig::new(Duration::from_secs(300)).unwrap(),
        );
        let ctx = QueryContext::new().with_org_id("bench");

        b.to_async(&rt).iter_custom(|iters| {
            let split = &split;
            let ctx = &ctx;
            async move {
                let start = Instant::now();
                for _ in 0..iters {
                    let merged = split.handle(ctx, day_query(8)).await.unwrap();
                    black_box(merged.0);
                }
                start.elapsed()
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_split_by_time,
    bench_split_query,
    bench_early_exit,
);
criterion_main!(benches);
