use core::time::Duration;
use futures::future::join_all;
use rangesplit::{
    Direction, Error, Handler, QueryContext, Response, Result, SplitByInterval, SplitConfig,
    StaticLimits, TimeQuery,
};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};
use tokio::time::{sleep, timeout};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Streams {
    /// Start second of every sub-range that contributed, in merge order.
    parts: Vec<u64>,
    entries: u64,
}

impl Response for Streams {
    fn entry_count(&self) -> u64 {
        self.entries
    }
}

#[derive(Debug, thiserror::Error)]
#[error("ingester unavailable for [{0}, {1})")]
struct IngesterDown(u64, u64);

/// A fake store keyed by sub-range start second.
///
/// `entries` maps a start second to the number of entries it holds (default
/// 1). Starts listed in `hang` block until cancelled; starts in `fail` error
/// out.
#[derive(Default)]
struct FakeStore {
    entries: HashMap<u64, u64>,
    hang: Vec<u64>,
    fail: Vec<u64>,
    calls: AtomicUsize,
    cancelled: AtomicUsize,
    dispatched: Mutex<Vec<u64>>,
}

impl Handler for FakeStore {
    type Response = Streams;

    async fn handle(&self, ctx: &QueryContext, query: TimeQuery) -> Result<Streams> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let start = secs(query.start);
        let end = secs(query.end);
        self.dispatched.lock().unwrap().push(start);

        if self.hang.contains(&start) {
            ctx.done().await;
            self.cancelled.fetch_add(1, Ordering::SeqCst);
            return Err(ctx.err().unwrap_or(Error::Cancelled));
        }
        if self.fail.contains(&start) {
            sleep(Duration::from_millis(30)).await;
            return Err(Error::subquery(IngesterDown(start, end)));
        }

        tokio::select! {
            () = ctx.done() => Err(ctx.err().unwrap_or(Error::Cancelled)),
            () = sleep(Duration::from_millis(5)) => Ok(Streams {
                parts: vec![start],
                entries: self.entries.get(&start).copied().unwrap_or(1),
            }),
        }
    }
}

fn merge(responses: Vec<Streams>) -> Result<Streams> {
    Ok(Streams {
        parts: responses.iter().flat_map(|s| s.parts.clone()).collect(),
        entries: responses.iter().map(|s| s.entries).sum(),
    })
}

type Split = SplitByInterval<FakeStore, StaticLimits, fn(Vec<Streams>) -> Result<Streams>>;

fn split(store: FakeStore, interval_secs: u64, parallelism: usize) -> Split {
    SplitByInterval::new(
        store,
        StaticLimits::new(parallelism),
        merge as fn(Vec<Streams>) -> Result<Streams>,
        SplitConfig::new(Duration::from_secs(interval_secs)).unwrap(),
    )
}

fn secs(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH).unwrap().as_secs()
}

fn query(start: u64, end: u64, limit: u32) -> TimeQuery {
    TimeQuery::new(
        "{app=\"checkout\"}",
        UNIX_EPOCH + Duration::from_secs(start),
        UNIX_EPOCH + Duration::from_secs(end),
    )
    .with_limit(limit)
}

fn ctx() -> QueryContext {
    QueryContext::new().with_org_id("tenant-a")
}

async fn assert_no_leaks(split: &Split) {
    let tasks = split.scheduler().tasks();
    tasks.close();
    timeout(Duration::from_secs(2), tasks.wait())
        .await
        .expect("spawned tasks outlived the query");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn forward_scenario_dispatches_ascending() {
    let split = split(FakeStore::default(), 30, 1);

    let merged = split.handle(&ctx(), query(0, 100, 1_000)).await.unwrap();

    assert_eq!(merged.parts, vec![0, 30, 60, 90]);
    assert_eq!(*split.inner().dispatched.lock().unwrap(), vec![0, 30, 60, 90]);
    assert_no_leaks(&split).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn backward_scenario_dispatches_descending() {
    let split = split(FakeStore::default(), 30, 1);
    let q = query(0, 100, 1_000).with_direction(Direction::Backward);

    let merged = split.handle(&ctx(), q).await.unwrap();

    assert_eq!(merged.parts, vec![90, 60, 30, 0]);
    assert_eq!(*split.inner().dispatched.lock().unwrap(), vec![90, 60, 30, 0]);
    assert_no_leaks(&split).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn early_exit_scenario_returns_collected_prefix() {
    let store = FakeStore {
        entries: HashMap::from([(0, 20), (30, 40), (60, 10)]),
        ..FakeStore::default()
    };
    let split = split(store, 30, 3);

    let merged = split.handle(&ctx(), query(0, 90, 50)).await.unwrap();

    assert_eq!(merged.parts, vec![0, 30]);
    assert_eq!(merged.entries, 60);
    assert_no_leaks(&split).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancelled_parent_returns_cancellation_error() {
    let store = FakeStore {
        hang: vec![0, 30, 60],
        ..FakeStore::default()
    };
    let split = split(store, 30, 3);
    let parent = ctx();

    let (result, ()) = tokio::join!(split.handle(&parent, query(0, 90, 50)), async {
        sleep(Duration::from_millis(30)).await;
        parent.cancel();
    });

    assert!(matches!(result, Err(Error::Cancelled)));
    assert_no_leaks(&split).await;
    assert_eq!(split.inner().cancelled.load(Ordering::SeqCst), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failing_sub_range_fails_the_whole_query() {
    let store = FakeStore {
        fail: vec![30],
        hang: vec![60],
        ..FakeStore::default()
    };
    let split = split(store, 30, 3);

    let err = split.handle(&ctx(), query(0, 90, 1_000)).await.unwrap_err();

    assert!(matches!(err, Error::Subquery(_)));
    assert_eq!(
        err.to_string(),
        "Sub-query failed: ingester unavailable for [30, 60)"
    );
    assert_no_leaks(&split).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn deadline_bounds_the_query() {
    let store = FakeStore {
        hang: vec![0],
        ..FakeStore::default()
    };
    let split = split(store, 30, 2);
    let ctx = ctx().with_timeout(Duration::from_millis(40));

    let err = split.handle(&ctx, query(0, 60, 10)).await.unwrap_err();

    assert!(matches!(err, Error::DeadlineExceeded));
    assert_no_leaks(&split).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_queries_share_one_splitter() {
    let split = Arc::new(split(FakeStore::default(), 10, 4));

    let results = join_all((0..8).map(|i| {
        let split = Arc::clone(&split);
        async move { split.handle(&ctx(), query(i * 100, i * 100 + 50, 1_000)).await }
    }))
    .await;

    for (i, result) in results.into_iter().enumerate() {
        let base = i as u64 * 100;
        let merged = result.unwrap();
        assert_eq!(
            merged.parts,
            vec![base, base + 10, base + 20, base + 30, base + 40]
        );
    }
    assert_eq!(split.inner().calls.load(Ordering::SeqCst), 40);
    split.shutdown().await.unwrap();
}
