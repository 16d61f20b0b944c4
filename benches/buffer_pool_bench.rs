use criterion::{criterion_group, criterion_main, Criterion, BenchmarkId};
use rand::prelude::*;

use std::sync::Arc;
use minidb::{BufferPoolManager, DbConfig, DiskManager, PageId};

const PAGE_SIZE: usize = 4096;

// Create a buffer pool over a temporary directory with `page_count` allocated pages
fn create_test_buffer_pool(
    frames: usize,
    page_count: usize,
    policy: &str,
) -> (Arc<BufferPoolManager>, Vec<PageId>, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().unwrap();
    let config = DbConfig {
        page_size: PAGE_SIZE,
        buffer_count: frames,
        replacement_policy: policy.to_string(),
        ..DbConfig::new(dir.path())
    };
    let disk_manager = Arc::new(DiskManager::new(&config).unwrap());
    disk_manager.init().unwrap();
    let buffer_pool = Arc::new(BufferPoolManager::new(&config, disk_manager.clone()));

    let data = generate_test_data(PAGE_SIZE);
    let page_ids: Vec<PageId> = (0..page_count)
        .map(|_| {
            let page_id = disk_manager.alloc_page().unwrap();
            disk_manager.write_page(page_id, &data).unwrap();
            page_id
        })
        .collect();

    (buffer_pool, page_ids, dir)
}

// Generate test data of specified size
fn generate_test_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

fn buffer_pool_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("BufferPool");

    for frames in [8usize, 64].iter() {
        group.bench_with_input(BenchmarkId::new("resident_access", frames), frames, |b, &frames| {
            let (buffer_pool, page_ids, _dir) = create_test_buffer_pool(frames, frames, "LRU");

            b.iter(|| {
                for &page_id in &page_ids {
                    let page = buffer_pool.get_page(page_id).unwrap();
                    {
                        let _page_guard = page.read();
                    }
                    buffer_pool.free_page(page_id, false);
                }
            });
        });

        for policy in ["LRU", "MRU"] {
            group.bench_with_input(
                BenchmarkId::new(format!("random_access_{}", policy), frames),
                frames,
                |b, &frames| {
                    let (buffer_pool, page_ids, _dir) = create_test_buffer_pool(frames, frames * 4, policy);
                    let mut rng = StdRng::seed_from_u64(42);

                    b.iter(|| {
                        for _ in 0..frames {
                            let page_id = *page_ids.choose(&mut rng).unwrap();
                            let page = buffer_pool.get_page(page_id).unwrap();
                            page.write().data[0] = rng.r#gen();
                            buffer_pool.free_page(page_id, true);
                        }
                    });
                },
            );
        }

        group.bench_with_input(BenchmarkId::new("sequential_scan_eviction", frames), frames, |b, &frames| {
            let (buffer_pool, page_ids, _dir) = create_test_buffer_pool(frames, frames * 2, "LRU");

            b.iter(|| {
                for &page_id in &page_ids {
                    buffer_pool.get_page(page_id).unwrap();
                    buffer_pool.free_page(page_id, false);
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, buffer_pool_benchmark);
criterion_main!(benches);
