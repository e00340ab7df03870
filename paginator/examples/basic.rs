// Example: drive the paginator by hand, the way an adapter would.
use paginator::{Changeset, Paginator, PaginatorOptions};

fn page(offset: usize) -> Vec<String> {
    (1..=10).map(|i| format!("Product {}", offset + i)).collect()
}

fn main() {
    let mut p = Paginator::new(PaginatorOptions::new());

    // The first page is requested unconditionally.
    let req = p.start(0).expect("idle paginator accepts start");
    p.complete(req.ticket, Ok(page(req.offset))).unwrap();
    println!("after first page: len={} state={:?}", p.len(), p.state());

    // Displaying a middle cell does nothing; the last one requests the next page.
    assert!(p.on_item_displayed(5, 0).is_none());
    let req = p.on_item_displayed(p.len() - 1, 0).unwrap();
    println!("fetching page {} at offset {}", req.page_index, req.offset);

    let before = p.items().to_vec();
    p.complete(req.ticket, Ok(page(req.offset))).unwrap();
    let changes = Changeset::between(&before, p.items());
    println!(
        "reconcile: inserted={} tail_only={}",
        changes.inserted.len(),
        changes.is_tail_insert_only(before.len())
    );
}
