use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use blocklist::{BlockPool, ListOptions, LongList, PoolConfig};

fn small_pool() -> BlockPool<u64> {
    BlockPool::with_config(PoolConfig::default().with_min_pooled_block_size(1)).unwrap()
}

fn list_with_block_size(block_size: usize) -> LongList<u64> {
    LongList::with_pool(
        small_pool(),
        ListOptions::default().with_block_size(block_size),
    )
    .unwrap()
}

#[test]
fn test_round_trip_in_insertion_order() {
    let mut list = list_with_block_size(16);
    let items = (0..1000u64).map(|i| i * 7 + 3).collect::<Vec<_>>();
    for &item in &items {
        list.push(item);
    }
    for (i, item) in items.iter().enumerate() {
        assert_eq!(list[i as u64], *item);
    }
    assert_eq!(list.iter().copied().collect::<Vec<_>>(), items);
}

#[test]
fn test_capacity_growth_is_monotonic_doubling() {
    let mut list = list_with_block_size(8);
    let mut previous = 0;
    for requested in [1u64, 5, 8, 9, 17, 40, 33, 100, 1000, 10] {
        list.ensure_capacity(requested);
        let capacity = list.capacity();
        assert!(capacity >= requested);
        assert!(capacity >= previous);
        if requested > previous && previous != 0 {
            // Smallest doubling of the previous capacity that fits.
            let mut expected = previous;
            while expected < requested {
                expected *= 2;
            }
            assert_eq!(capacity, expected);
        }
        previous = capacity;
    }
    assert_eq!(list.capacity(), 1024);
}

#[test]
fn test_sentinel_search_across_blocks() {
    let mut list = list_with_block_size(4);
    list.extend(0..10);
    list[7] = 12345;
    assert_eq!(list.index_of_sequential(&12345), Some(7));
    assert_eq!(list.index_of(&12345), Some(7));
}

#[test]
fn test_insert_range_matches_flat_splice() {
    for start in [0u64, 4, 2] {
        let mut list = list_with_block_size(4);
        list.extend(0..8);
        list.insert_range(start, [100, 101, 102, 103, 104]).unwrap();

        let mut expected = (0..8).collect::<Vec<u64>>();
        expected.splice(start as usize..start as usize, [100, 101, 102, 103, 104]);
        assert_eq!(list.to_vec(), expected, "start = {start}");
    }
}

#[test]
fn test_insert_range_at_end_is_append() {
    let mut list = list_with_block_size(4);
    list.extend(0..6);
    list.insert_range(6, (6..20).collect::<Vec<u64>>()).unwrap();
    assert_eq!(list.to_vec(), (0..20).collect::<Vec<_>>());
}

#[test]
fn test_insert_range_panicking_source_leaves_list_empty() {
    let pool = small_pool();
    let mut list =
        LongList::with_pool(pool.clone(), ListOptions::default().with_block_size(4)).unwrap();
    list.extend(0..10);

    let items = (0..6u32).map(|i| {
        if i == 3 {
            panic!("source failed");
        }
        u64::from(i)
    });
    let result = catch_unwind(AssertUnwindSafe(|| list.insert_range(5, items)));
    assert!(result.is_err());

    assert!(list.is_empty());
    assert_eq!(list.capacity(), 0);
    assert_eq!(list.directory_len(), 0);
    assert!(pool.bucket(4).unwrap().retained_count() > 0);

    list.extend(0..5);
    assert_eq!(list.to_vec(), (0..5).collect::<Vec<_>>());
}

#[test]
fn test_clear_then_refill_matches_fresh_list() {
    let mut list = list_with_block_size(4);
    list.extend(0..37);
    list.clear();
    assert_eq!(list.long_len(), 0);
    list.extend(100..130);

    let mut fresh = list_with_block_size(4);
    fresh.extend(100..130);

    assert_eq!(list, fresh);
    assert_eq!(list.capacity(), fresh.capacity());
    assert_eq!(list.directory_len(), fresh.directory_len());
    assert_eq!(list.last_block_with_data(), fresh.last_block_with_data());
    assert_eq!(list.next_item_index(), fresh.next_item_index());
    assert_eq!(list.next_item_block_index(), fresh.next_item_block_index());
}

#[test]
fn test_cursor_invalidated_by_mutation() {
    let mutations: [fn(&mut LongList<u64>); 6] = [
        |l| l.push(1),
        |l| l.insert(2, 9).unwrap(),
        |l| {
            l.remove_at(0).unwrap();
        },
        |l| l.clear(),
        |l| l.insert_range(1, [5, 6]).unwrap(),
        |l| {
            l.set(0, 3).unwrap();
        },
    ];
    for mutate in mutations {
        let mut list = list_with_block_size(4);
        list.extend(0..6);
        let mut cursor = list.cursor();
        assert_eq!(cursor.advance(&list).unwrap(), Some(&0));
        mutate(&mut list);
        let err = cursor.advance(&list).unwrap_err();
        assert!(err.is_invalid_operation());
    }
}

#[test]
fn test_cursor_completes_without_mutation() {
    let mut list = list_with_block_size(4);
    list.extend(0..9);
    let mut cursor = list.cursor();
    let mut seen = Vec::new();
    while let Some(item) = cursor.advance(&list).unwrap() {
        seen.push(*item);
    }
    assert_eq!(seen, (0..9).collect::<Vec<_>>());
    assert_eq!(cursor.advance(&list).unwrap(), None);

    list.push(9);
    cursor.reset(&list);
    assert_eq!(cursor.advance(&list).unwrap(), Some(&0));
}

#[test]
fn test_pool_reuse_law() {
    const N: usize = 20;
    let pool = BlockPool::<u64>::with_config(
        PoolConfig::default()
            .with_min_pooled_block_size(1)
            .with_max_retained_blocks(N),
    )
    .unwrap();

    let first = (0..N).map(|_| pool.rent(256)).collect::<Vec<_>>();
    for block in first {
        pool.return_block(block, false);
    }
    let allocated = pool.stats().allocated_blocks;
    assert_eq!(allocated, N as u64);

    let second = (0..N).map(|_| pool.rent(256)).collect::<Vec<_>>();
    assert_eq!(pool.stats().allocated_blocks, allocated);
    assert_eq!(pool.stats().reused_blocks, N as u64);
    drop(second);
}

#[test]
fn test_lists_sharing_a_pool_reuse_blocks() {
    let pool = small_pool();
    let options = ListOptions::default().with_block_size(64);
    {
        let mut list = LongList::with_pool(pool.clone(), options.clone()).unwrap();
        list.extend(0..1000);
    }
    let allocated = pool.stats().allocated_blocks;

    let mut list = LongList::with_pool(pool.clone(), options).unwrap();
    list.extend(0..1000);
    assert_eq!(pool.stats().allocated_blocks, allocated);
}

#[test]
fn test_random_operations_match_vec() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    let mut list = list_with_block_size(8);
    let mut model: Vec<u64> = Vec::new();

    for step in 0..4000 {
        match rng.u32(0..100) {
            0..40 => {
                let item = rng.u64(..1000);
                list.push(item);
                model.push(item);
            }
            40..55 => {
                let index = rng.usize(0..=model.len());
                let item = rng.u64(..1000);
                list.insert(index as u64, item).unwrap();
                model.insert(index, item);
            }
            55..70 if !model.is_empty() => {
                let index = rng.usize(0..model.len());
                assert_eq!(list.remove_at(index as u64).unwrap(), model.remove(index));
            }
            70..75 => {
                let index = rng.usize(0..=model.len());
                let items = (0..rng.u64(0..20)).map(|i| i + 5000).collect::<Vec<_>>();
                list.insert_range(index as u64, items.iter().copied()).unwrap();
                model.splice(index..index, items);
            }
            75..85 if !model.is_empty() => {
                let index = rng.usize(0..model.len());
                let item = rng.u64(..1000);
                list.set(index as u64, item).unwrap();
                model[index] = item;
            }
            85..95 => {
                let item = rng.u64(..1000);
                let expected = model.iter().position(|&x| x == item).map(|i| i as u64);
                assert_eq!(list.index_of(&item), expected);
            }
            95..97 => {
                assert_eq!(list.pop().ok(), model.pop());
            }
            97 => {
                list.shrink_to_fit();
            }
            98 if step % 7 == 0 => {
                list.clear();
                model.clear();
            }
            _ => {}
        }
        assert_eq!(list.long_len(), model.len() as u64);
        assert!(list.capacity() >= list.long_len());
        assert_eq!(list.capacity() % 8, 0);
    }
    assert_eq!(list.to_vec(), model);
}

#[test]
fn test_pooled_blocks_do_not_keep_elements_alive() {
    let pool = BlockPool::<Option<Arc<u64>>>::with_config(
        PoolConfig::default().with_min_pooled_block_size(1),
    )
    .unwrap();
    let token = Arc::new(7u64);
    let mut list =
        LongList::with_pool(pool.clone(), ListOptions::default().with_block_size(4)).unwrap();

    for _ in 0..10 {
        list.push(Some(token.clone()));
    }
    list.insert_range(3, (0..5).map(|_| Some(token.clone()))).unwrap();
    assert_eq!(Arc::strong_count(&token), 16);
    assert!(pool.bucket(4).unwrap().retained_count() > 0);

    drop(list.remove_at(0).unwrap());
    drop(list.pop().unwrap());
    assert_eq!(list.long_len(), 13);
    assert_eq!(Arc::strong_count(&token), 14);

    list.shrink_to_fit();
    assert_eq!(Arc::strong_count(&token), 14);

    list.clear();
    assert_eq!(Arc::strong_count(&token), 1);
    assert!(pool.bucket(4).unwrap().retained_count() > 0);

    list.extend((0..6).map(|_| Some(token.clone())));
    drop(list);
    assert_eq!(Arc::strong_count(&token), 1);
}
