//! 里程碑判定性能基准测试
//!
//! 测试覆盖：
//! - 单次阈值判定
//! - 不同历史规模下的判定
//! - 连续计数增长的完整判定序列

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use milestone_service::milestone::{MilestonePolicy, evaluate, is_milestone};
use milestone_service::models::{EventPrefix, NotificationHistory};
use std::hint::black_box;

/// 创建包含 n 个已发送事件的历史
fn create_history(size: i64) -> NotificationHistory {
    (1..=size)
        .map(|i| (EventPrefix::Bookmark.event_key(i * 100), true))
        .collect()
}

/// 阈值判定基准
fn bench_is_milestone(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_milestone");

    for count in [9_i64, 100, 2000, 123_457] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| is_milestone(black_box(count)))
        });
    }

    group.finish();
}

/// 历史规模对判定的影响
fn bench_evaluate_with_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_with_history");

    for size in [0_i64, 10, 100, 1000] {
        let history = create_history(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &history, |b, history| {
            b.iter(|| {
                evaluate(
                    black_box(5000),
                    EventPrefix::Bookmark,
                    MilestonePolicy::Standard,
                    black_box(history),
                )
            })
        });
    }

    group.finish();
}

/// 计数从 0 增长到 n 的完整序列
fn bench_growth_sequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("growth_sequence");

    for n in [1_000_i64, 10_000] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut history = NotificationHistory::new();
                for count in 0..=n {
                    let result =
                        evaluate(count, EventPrefix::Like, MilestonePolicy::Standard, &history);
                    if result.fires {
                        history = history.mark_sent(result.event_key);
                    }
                }
                black_box(history)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_is_milestone,
    bench_evaluate_with_history,
    bench_growth_sequence
);
criterion_main!(benches);
