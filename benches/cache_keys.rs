//! 缓存键构建与上报解析基准测试

use criterion::{Criterion, criterion_group, criterion_main};
use postpulse::cache::keys::{CacheKey, metrics_key, post_detail_key};
use postpulse::engagement::{ShareChannel, is_likely_bot};
use std::hint::black_box;

fn bench_keys(c: &mut Criterion) {
    c.bench_function("keys/metrics_short", |b| {
        b.iter(|| metrics_key(black_box("hello-world")))
    });

    let long_slug = "a".repeat(240);
    c.bench_function("keys/metrics_hashed", |b| {
        b.iter(|| metrics_key(black_box(&long_slug)))
    });

    c.bench_function("keys/post_detail", |b| {
        b.iter(|| post_detail_key(black_box("hello-world"), black_box("de")))
    });

    c.bench_function("keys/builder", |b| {
        b.iter(|| {
            CacheKey::new("blog_custom")
                .arg(black_box("hello-world"))
                .named("page", 3)
                .build()
        })
    });
}

fn bench_engagement_parsing(c: &mut Criterion) {
    c.bench_function("channel/parse", |b| {
        b.iter(|| ShareChannel::parse(black_box(" LinkedIn ")))
    });

    let browser = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                   (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    c.bench_function("bot/browser", |b| b.iter(|| is_likely_bot(black_box(browser))));

    let crawler = "Mozilla/5.0 (compatible; bingbot/2.0; +http://www.bing.com/bingbot.htm)";
    c.bench_function("bot/crawler", |b| b.iter(|| is_likely_bot(black_box(crawler))));
}

criterion_group!(benches, bench_keys, bench_engagement_parsing);
criterion_main!(benches);
