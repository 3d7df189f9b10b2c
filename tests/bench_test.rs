//! Benchmark tests for critical operations
//!
//! Run with: cargo test --release -- --nocapture bench

use std::sync::Arc;
use std::time::Instant;
use tempfile::NamedTempFile;

use url_shortener::database::RedbStore;
use url_shortener::manager::UrlManager;

/// Benchmark helper to measure execution time
fn benchmark<F>(name: &str, iterations: usize, mut f: F)
where
    F: FnMut(),
{
    let start = Instant::now();

    for _ in 0..iterations {
        f();
    }

    let duration = start.elapsed();
    let avg_ms = duration.as_millis() as f64 / iterations as f64;
    let ops_per_sec = (iterations as f64 / duration.as_secs_f64()) as u64;

    println!("  {} ({} iterations)", name, iterations);
    println!("    Total time: {:?}", duration);
    println!("    Avg time: {:.3}ms", avg_ms);
    println!("    Throughput: {} ops/sec\n", ops_per_sec);
}

fn file_backed_manager(temp_db: &NamedTempFile) -> UrlManager {
    let store = RedbStore::open(temp_db.path().to_str().unwrap()).unwrap();
    UrlManager::new(Arc::new(store))
}

#[test]
#[ignore] // Run explicitly with: cargo test bench --release -- --ignored --nocapture
fn bench_create_urls() {
    println!("\n=== Benchmark: Create URLs ===\n");

    let temp_db = NamedTempFile::new().unwrap();
    let manager = file_backed_manager(&temp_db);

    let iterations = 1000;
    benchmark("Create with random key", iterations, || {
        let _ = manager.create_short_url("https://example.com/bench");
    });

    let mut i = 0;
    benchmark("Create with custom key", iterations, || {
        i += 1;
        let _ = manager.create_short_url_with_custom_key("https://example.com/bench", &format!("custom-{}", i));
    });
}

#[test]
#[ignore]
fn bench_resolve() {
    println!("\n=== Benchmark: Resolve ===\n");

    let temp_db = NamedTempFile::new().unwrap();
    let manager = file_backed_manager(&temp_db);

    println!("  Preparing: Creating 1000 URLs...");
    let keys: Vec<String> = (0..1000)
        .map(|i| {
            manager
                .create_short_url(&format!("https://example.com/resolve{}", i))
                .unwrap()
                .key
        })
        .collect();
    println!("  Done!\n");

    let iterations = 1000;
    let mut next = keys.iter().cycle();
    benchmark("Resolve (click increment)", iterations, || {
        let _ = manager.resolve(next.next().unwrap());
    });
}

#[tokio::test(flavor = "multi_thread")]
#[ignore]
async fn bench_concurrent_operations() {
    println!("\n=== Benchmark: Concurrent Operations ===\n");

    let temp_db = NamedTempFile::new().unwrap();
    let manager = file_backed_manager(&temp_db);
    let record = manager.create_short_url("https://example.com/hot").unwrap();

    let num_tasks = 100;
    let ops_per_task = 10;

    println!("  Running {} concurrent tasks with {} resolves each...", num_tasks, ops_per_task);

    let start = Instant::now();

    let mut handles = vec![];

    for _ in 0..num_tasks {
        let manager = manager.clone();
        let key = record.key.clone();

        let handle = tokio::task::spawn_blocking(move || {
            for _ in 0..ops_per_task {
                manager.resolve(&key).unwrap();
            }
        });

        handles.push(handle);
    }

    // Wait for all tasks
    for handle in handles {
        handle.await.unwrap();
    }

    let duration = start.elapsed();
    let total_ops = num_tasks * ops_per_task;
    let ops_per_sec = total_ops as f64 / duration.as_secs_f64();

    println!("  Total operations: {}", total_ops);
    println!("  Total time: {:?}", duration);
    println!("  Throughput: {:.0} ops/sec\n", ops_per_sec);

    let info = manager.admin_info(&record.secret_key).unwrap();
    assert_eq!(info.clicks, total_ops as u64);
}

#[test]
fn bench_summary() {
    println!("\n{}", "=".repeat(60));
    println!("Benchmark Test Suite");
    println!("{}", "=".repeat(60));
    println!("\nTo run benchmarks, use:");
    println!("  cargo test --release bench -- --ignored --nocapture");
    println!("\nAvailable benchmarks:");
    println!("  • bench_create_urls           - URL creation performance");
    println!("  • bench_resolve               - Redirect lookup with click counting");
    println!("  • bench_concurrent_operations - Concurrent resolves of one key");
    println!("\n{}\n", "=".repeat(60));
}
