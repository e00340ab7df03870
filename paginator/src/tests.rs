use crate::*;

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        debug_assert!(start < end_exclusive);
        let span = (end_exclusive - start) as u64;
        start + (self.next_u64() % span) as usize
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct Product {
    name: String,
    image_url: String,
}

fn product(n: usize) -> Product {
    Product {
        name: format!("Product {n}"),
        image_url: format!("https://source.unsplash.com/random/?product&{n}"),
    }
}

/// Products `offset + 1 ..= offset + len`, like the demo source.
fn page(offset: usize, len: usize) -> Vec<Product> {
    (1..=len).map(|i| product(offset + i)).collect()
}

fn names(p: &Paginator<Product>) -> Vec<String> {
    p.items().iter().map(|e| e.value.name.clone()).collect()
}

fn loaded(pages: usize) -> Paginator<Product> {
    let mut p = Paginator::new(PaginatorOptions::new());
    for _ in 0..pages {
        let req = if p.is_empty() {
            p.start(0).unwrap()
        } else {
            p.on_item_displayed(p.len() - 1, 0).unwrap()
        };
        p.complete(req.ticket, Ok(page(req.offset, 10))).unwrap();
    }
    p
}

#[test]
fn first_pages_scenario() {
    let mut p = Paginator::<Product>::new(PaginatorOptions::new());
    assert_eq!(p.phase(), Phase::Idle);
    assert!(!p.footer_loading());

    let first = p.start(0).unwrap();
    assert_eq!(first.offset, 0);
    assert_eq!(first.page_index, 0);
    assert!(p.footer_loading());

    let done = p.complete(first.ticket, Ok(page(0, 10))).unwrap();
    assert_eq!(done, Completion::Appended { range: 0..10 });
    assert_eq!(names(&p).first().map(String::as_str), Some("Product 1"));
    assert_eq!(names(&p).last().map(String::as_str), Some("Product 10"));
    assert!(!p.footer_loading());
    assert_eq!(p.phase(), Phase::Idle);

    let second = p.on_item_displayed(9, 100).unwrap();
    assert_eq!(p.phase(), Phase::Fetching);
    assert!(p.footer_loading());
    assert_eq!(second.offset, 10);
    assert_eq!(second.page_index, 1);
    assert_eq!(second.issued_at_ms, 100);

    p.complete(second.ticket, Ok(page(10, 10))).unwrap();
    let expected: Vec<String> = (1..=20).map(|n| format!("Product {n}")).collect();
    assert_eq!(names(&p), expected);
    assert!(!p.footer_loading());
    assert_eq!(p.phase(), Phase::Idle);
    assert_eq!(p.pages_loaded(), 2);
}

#[test]
fn displaying_a_middle_item_does_not_fetch() {
    let mut p = loaded(1);
    assert_eq!(p.len(), 10);
    assert_eq!(p.on_item_displayed(5, 0), None);
    assert_eq!(p.phase(), Phase::Idle);
}

#[test]
fn repeated_end_events_while_fetching_issue_one_fetch() {
    let mut p = loaded(1);
    let req = p.on_item_displayed(9, 0).unwrap();
    for _ in 0..5 {
        assert_eq!(p.on_item_displayed(9, 0), None);
    }
    assert_eq!(p.in_flight(), Some(&req));
}

#[test]
fn start_is_ignored_while_fetching() {
    let mut p = Paginator::<Product>::default();
    let req = p.start(0).unwrap();
    assert_eq!(p.start(0), None);
    assert_eq!(p.in_flight(), Some(&req));
}

#[test]
fn empty_list_never_triggers() {
    let mut p = Paginator::<Product>::default();
    assert!(!p.is_trigger_index(0));
    assert_eq!(p.on_item_displayed(0, 0), None);
    assert_eq!(p.on_item_displayed(usize::MAX, 0), None);
}

#[test]
fn out_of_range_index_never_triggers() {
    let mut p = loaded(1);
    assert_eq!(p.on_item_displayed(10, 0), None);
    assert_eq!(p.on_item_displayed(usize::MAX, 0), None);
}

#[test]
fn trigger_fires_iff_last_index() {
    let mut rng = Lcg::new(7);
    for _ in 0..200 {
        let mut p = loaded(rng.gen_range_usize(1, 4));
        let len = p.len();
        let index = rng.gen_range_usize(0, len + 3);
        let fired = p.on_item_displayed(index, 0).is_some();
        assert_eq!(fired, index == len - 1, "index={index} len={len}");
    }
}

#[test]
fn prefetch_distance_widens_the_trigger() {
    let mut p = loaded(1);
    p.update_options(|o| o.prefetch_distance = 2);
    assert!(!p.is_trigger_index(6));
    assert!(p.is_trigger_index(7));
    assert!(p.is_trigger_index(9));
    assert!(!p.is_trigger_index(10));
    assert!(p.on_item_displayed(7, 0).is_some());
}

#[test]
fn list_is_the_concatenation_of_pages() {
    let mut rng = Lcg::new(42);
    for _ in 0..50 {
        let mut p = Paginator::<Product>::default();
        let mut expected = Vec::new();
        let mut req = p.start(0).unwrap();
        let mut next = 1usize;
        for _ in 0..rng.gen_range_usize(1, 8) {
            let len = rng.gen_range_usize(1, 12);
            let items: Vec<Product> = (0..len).map(|i| product(next + i)).collect();
            next += len;
            expected.extend(items.iter().cloned());
            p.complete(req.ticket, Ok(items)).unwrap();
            req = p.on_item_displayed(p.len() - 1, 0).unwrap();
        }
        let got: Vec<Product> = p.items().iter().map(|e| e.value.clone()).collect();
        assert_eq!(got, expected);
    }
}

#[test]
fn at_most_one_fetch_in_flight_under_random_events() {
    let mut rng = Lcg::new(0xfeed);
    let mut p = Paginator::<Product>::default();
    let mut outstanding: Vec<FetchRequest> = Vec::new();
    outstanding.extend(p.start(0));

    for step in 0..2_000u64 {
        if rng.gen_bool() && !outstanding.is_empty() {
            let req = outstanding.remove(0);
            let len = rng.gen_range_usize(1, 6);
            p.complete(req.ticket, Ok(page(req.offset, len))).unwrap();
        } else if !p.is_empty() {
            let index = rng.gen_range_usize(0, p.len());
            outstanding.extend(p.on_item_displayed(index, step));
        }
        assert!(outstanding.len() <= 1);
        assert_eq!(p.is_fetching(), outstanding.len() == 1);
        assert_eq!(p.state().is_fetching_next_page, p.in_flight().is_some());
    }
}

#[test]
fn ids_distinguish_duplicate_values() {
    let mut p = Paginator::<Product>::default();
    let req = p.start(0).unwrap();
    p.complete(req.ticket, Ok(page(0, 3))).unwrap();
    let req = p.on_item_displayed(2, 0).unwrap();
    // The source repeats itself; the list keeps both copies with distinct ids.
    p.complete(req.ticket, Ok(page(0, 3))).unwrap();

    assert_eq!(p.len(), 6);
    assert_eq!(p.items()[0].value, p.items()[3].value);
    assert_ne!(p.items()[0].id, p.items()[3].id);
    let ids: Vec<u64> = p.items().iter().map(|e| e.id.get()).collect();
    assert_eq!(ids, [0, 1, 2, 3, 4, 5]);
}

#[test]
fn failed_fetch_returns_to_idle_and_retries() {
    let mut p = loaded(1);
    let req = p.on_item_displayed(9, 0).unwrap();
    let done = p
        .complete(req.ticket, Err(FetchError::Failed("offline".into())))
        .unwrap();
    assert_eq!(done, Completion::Failed(FetchError::Failed("offline".into())));
    assert_eq!(p.phase(), Phase::Idle);
    assert!(!p.footer_loading());
    assert_eq!(p.len(), 10);
    assert!(p.last_error().is_some());

    let retry = p.on_item_displayed(9, 0).unwrap();
    assert_eq!(retry.offset, 10);
    assert_eq!(retry.page_index, 1);
    p.complete(retry.ticket, Ok(page(10, 10))).unwrap();
    assert_eq!(p.len(), 20);
    assert_eq!(p.last_error(), None);
}

#[test]
fn empty_page_exhausts_until_resumed() {
    let mut p = loaded(1);
    let req = p.on_item_displayed(9, 0).unwrap();
    assert_eq!(
        p.complete(req.ticket, Ok(Vec::new())).unwrap(),
        Completion::Exhausted
    );
    assert!(p.is_exhausted());
    assert!(!p.footer_loading());
    assert_eq!(p.on_item_displayed(9, 0), None);
    assert_eq!(p.start(0), None);

    p.resume();
    assert_eq!(p.phase(), Phase::Idle);
    assert!(p.on_item_displayed(9, 0).is_some());
}

#[test]
fn empty_page_can_be_ignored() {
    let mut p = loaded(1);
    p.update_options(|o| o.stop_on_empty_page = false);
    let req = p.on_item_displayed(9, 0).unwrap();
    assert_eq!(p.complete(req.ticket, Ok(Vec::new())).unwrap(), Completion::Empty);
    assert_eq!(p.phase(), Phase::Idle);
    assert_eq!(p.pages_loaded(), 1);
}

#[test]
fn max_pages_exhausts_after_the_last_page() {
    let mut p = Paginator::<Product>::new(PaginatorOptions::new().with_max_pages(Some(2)));
    let req = p.start(0).unwrap();
    p.complete(req.ticket, Ok(page(0, 10))).unwrap();
    let req = p.on_item_displayed(9, 0).unwrap();
    let done = p.complete(req.ticket, Ok(page(10, 10))).unwrap();
    assert_eq!(done, Completion::Appended { range: 10..20 });
    assert!(p.is_exhausted());
    assert_eq!(p.on_item_displayed(19, 0), None);
}

#[test]
fn completion_without_fetch_is_rejected() {
    let mut p = Paginator::<Product>::default();
    let ticket = FetchTicket {
        generation: 0,
        seq: 0,
    };
    assert_eq!(
        p.complete(ticket, Ok(page(0, 1))),
        Err(PaginateError::NoFetchInFlight { got: ticket })
    );
    assert!(p.is_empty());
}

#[test]
fn stale_ticket_is_rejected_without_mutation() {
    let mut p = loaded(1);
    let abandoned = p.on_item_displayed(9, 0).unwrap();
    assert_eq!(p.cancel(), Some(abandoned));
    let current = p.on_item_displayed(9, 0).unwrap();

    let err = p.complete(abandoned.ticket, Ok(page(10, 10))).unwrap_err();
    assert_eq!(
        err,
        PaginateError::StaleTicket {
            expected: current.ticket,
            got: abandoned.ticket,
        }
    );
    assert_eq!(p.len(), 10);
    assert!(p.is_fetching());
}

#[test]
fn reset_cancels_and_clears() {
    let mut p = loaded(2);
    let before = p.on_item_displayed(19, 0).unwrap();
    p.reset();
    assert!(p.is_empty());
    assert_eq!(p.phase(), Phase::Idle);
    assert_eq!(p.pages_loaded(), 0);
    assert!(p.complete(before.ticket, Ok(page(20, 10))).is_err());

    let req = p.start(0).unwrap();
    assert_ne!(req.ticket.generation, before.ticket.generation);
    p.complete(req.ticket, Ok(page(0, 2))).unwrap();
    // Ids keep counting after a reset.
    assert_eq!(p.items()[0].id, ItemId(20));
}

#[test]
fn in_flight_fetch_times_out() {
    let mut p = Paginator::<Product>::new(
        PaginatorOptions::new().with_fetch_timeout_ms(Some(5_000)),
    );
    let req = p.start(1_000).unwrap();
    assert_eq!(p.update_timeouts(5_999), None);
    assert!(p.is_fetching());

    let done = p.update_timeouts(6_000).unwrap();
    assert_eq!(
        done,
        Completion::Failed(FetchError::TimedOut { elapsed_ms: 5_000 })
    );
    assert_eq!(p.phase(), Phase::Idle);

    // The late page is dropped.
    assert!(p.complete(req.ticket, Ok(page(0, 10))).is_err());
    assert!(p.is_empty());
}

#[test]
fn no_timeout_by_default() {
    let mut p = Paginator::<Product>::default();
    p.start(0).unwrap();
    assert_eq!(p.update_timeouts(u64::MAX), None);
    assert!(p.is_fetching());
}

#[test]
fn store_empty_append_is_a_no_op() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut s = ListStore::<Product>::new().with_on_change(Some({
        let calls = Arc::clone(&calls);
        move |_: &[Entry<Product>]| {
            calls.fetch_add(1, Ordering::Relaxed);
        }
    }));

    assert_eq!(s.append(Vec::new()), 0..0);
    assert_eq!(s.revision(), 0);
    assert_eq!(calls.load(Ordering::Relaxed), 0);

    assert_eq!(s.append(page(0, 3)), 0..3);
    assert_eq!(s.append(page(3, 2)), 3..5);
    assert_eq!(s.revision(), 2);
    assert_eq!(calls.load(Ordering::Relaxed), 2);
}

#[test]
fn store_notifies_with_full_collection() {
    let seen = Arc::new(AtomicUsize::new(0));
    let mut s = ListStore::<Product>::new().with_on_change(Some({
        let seen = Arc::clone(&seen);
        move |items: &[Entry<Product>]| {
            seen.store(items.len(), Ordering::Relaxed);
        }
    }));
    s.append(page(0, 4));
    s.append(page(4, 4));
    assert_eq!(seen.load(Ordering::Relaxed), 8);
}

#[test]
fn store_clear_does_not_notify() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut s = ListStore::<Product>::new().with_on_change(Some({
        let calls = Arc::clone(&calls);
        move |_: &[Entry<Product>]| {
            calls.fetch_add(1, Ordering::Relaxed);
        }
    }));
    s.append(page(0, 2));
    s.clear();
    assert!(s.is_empty());
    assert_eq!(s.revision(), 2);
    assert_eq!(calls.load(Ordering::Relaxed), 1);
}

#[test]
fn store_batch_update_coalesces() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut s = ListStore::<Product>::new().with_on_change(Some({
        let calls = Arc::clone(&calls);
        move |_: &[Entry<Product>]| {
            calls.fetch_add(1, Ordering::Relaxed);
        }
    }));
    s.batch_update(|s| {
        s.append(page(0, 1));
        s.batch_update(|s| {
            s.append(page(1, 1));
            s.append(page(2, 1));
        });
    });
    assert_eq!(s.len(), 3);
    assert_eq!(calls.load(Ordering::Relaxed), 1);
}

#[test]
fn store_position_finds_ids() {
    let mut s = ListStore::<Product>::new();
    s.append(page(0, 5));
    let id = s.get(3).unwrap().id;
    assert_eq!(s.position(id), Some(3));
    assert_eq!(s.position(ItemId(99)), None);
}

#[test]
fn paginator_on_change_sees_appends() {
    let seen = Arc::new(AtomicUsize::new(0));
    let mut p = Paginator::<Product>::default();
    p.set_on_change(Some({
        let seen = Arc::clone(&seen);
        move |items: &[Entry<Product>]| {
            seen.store(items.len(), Ordering::Relaxed);
        }
    }));
    let req = p.start(0).unwrap();
    p.complete(req.ticket, Ok(page(0, 10))).unwrap();
    assert_eq!(seen.load(Ordering::Relaxed), 10);
}

#[test]
fn append_reconciles_to_tail_inserts() {
    let mut rng = Lcg::new(3);
    for _ in 0..100 {
        let mut s = ListStore::<Product>::new();
        s.append(page(0, rng.gen_range_usize(0, 30)));
        let old = s.snapshot();
        let added = rng.gen_range_usize(1, 15);
        s.append(page(old.len(), added));

        let changes = Changeset::between(&old, s.current());
        assert!(changes.is_tail_insert_only(old.len()));
        assert_eq!(changes.inserted.len(), added);
        assert_eq!(changes.inserted[0].index, old.len());
        assert_eq!(changes.inserted[0].key, s.current()[old.len()].id);
    }
}

#[test]
fn identical_values_append_as_inserts() {
    let mut s = ListStore::<Product>::new();
    s.append([product(1), product(1)]);
    let old = s.snapshot();
    s.append([product(1)]);
    let changes = Changeset::between(&old, s.current());
    assert!(changes.is_tail_insert_only(2));
    assert_eq!(changes.inserted.len(), 1);
}

#[test]
fn diff_of_equal_sequences_is_empty() {
    let a = [1u32, 2, 3];
    let changes = diff_by_key(&a, &a, |v| *v);
    assert!(changes.is_empty());
    assert_eq!(changes.len(), 0);
}

#[test]
fn diff_reports_removals_and_insertions() {
    let old = ['a', 'b', 'c', 'd'];
    let new = ['a', 'c', 'e'];
    let changes = diff_by_key(&old, &new, |c| *c);
    assert_eq!(
        changes.removed,
        [Removal { index: 1, key: 'b' }, Removal { index: 3, key: 'd' }]
    );
    assert_eq!(changes.inserted, [Insertion { index: 2, key: 'e' }]);
    assert!(changes.moved.is_empty());
    assert!(changes.updated.is_empty());
}

#[test]
fn diff_moves_only_what_left_the_longest_run() {
    let old = ['a', 'b', 'c', 'd', 'e'];
    let new = ['e', 'a', 'b', 'c', 'd'];
    let changes = diff_by_key(&old, &new, |c| *c);
    assert_eq!(
        changes.moved,
        [Move {
            from: 4,
            to: 0,
            key: 'e'
        }]
    );
    assert!(changes.removed.is_empty());
    assert!(changes.inserted.is_empty());
}

#[test]
fn diff_reports_updates_by_key() {
    let old = [(1u32, "one"), (2, "two")];
    let new = [(1u32, "uno"), (2, "two")];
    let changes = diff_by_key(&old, &new, |(k, _)| *k);
    assert_eq!(changes.updated, [Update { index: 0, key: 1 }]);
    assert_eq!(changes.len(), 1);
}

#[test]
fn diff_tolerates_duplicate_keys() {
    let old = [1u32, 1];
    let new = [1u32];
    let changes = diff_by_key(&old, &new, |v| *v);
    assert_eq!(changes.removed, [Removal { index: 1, key: 1 }]);
    assert!(changes.inserted.is_empty());
}

#[test]
fn random_diffs_replay_to_the_new_sequence() {
    let mut rng = Lcg::new(0xdecaf);
    for _ in 0..300 {
        let old_len = rng.gen_range_usize(0, 25);
        let old: Vec<(u32, u32)> = (0..old_len as u32).map(|k| (k, 0)).collect();

        // Keep a random subset, shuffle it, touch some values, and add new keys.
        let mut new: Vec<(u32, u32)> = old.iter().copied().filter(|_| rng.gen_bool()).collect();
        for i in (1..new.len()).rev() {
            if rng.gen_bool() {
                let j = rng.gen_range_usize(0, i + 1);
                new.swap(i, j);
            }
        }
        for item in new.iter_mut() {
            if rng.gen_range_usize(0, 4) == 0 {
                item.1 += 1;
            }
        }
        for k in 0..rng.gen_range_usize(0, 6) as u32 {
            let at = rng.gen_range_usize(0, new.len() + 1);
            new.insert(at, (1_000 + k, 0));
        }

        let changes = diff_by_key(&old, &new, |(k, _)| *k);
        let replayed = changes.apply(
            old.clone(),
            |ins| new[ins.index],
            |u, cell| *cell = new[u.index],
        );
        assert_eq!(replayed, new);

        let retained = old.len() - changes.removed.len();
        assert_eq!(retained + changes.inserted.len(), new.len());
        assert!(changes.moved.len() <= retained);
    }
}

#[test]
fn state_snapshot_tracks_phase() {
    let mut p = loaded(1);
    assert_eq!(
        p.state(),
        PaginationState {
            phase: Phase::Idle,
            item_count: 10,
            pages_loaded: 1,
            is_fetching_next_page: false,
        }
    );
    p.on_item_displayed(9, 0).unwrap();
    assert!(p.state().is_fetching_next_page);
    assert_eq!(p.state().phase, Phase::Fetching);
}

#[test]
fn errors_render_readable_messages() {
    assert_eq!(
        format!("{}", FetchError::TimedOut { elapsed_ms: 42 }),
        "page fetch timed out after 42 ms"
    );
    assert_eq!(
        format!("{}", FetchError::Failed("offline".into())),
        "page fetch failed: offline"
    );
}
