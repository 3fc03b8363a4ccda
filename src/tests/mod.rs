use std::num::NonZeroUsize;

use serde_json::{json, Value};

use crate::password::{self, Tier};
use crate::relay::replay::{parse_recording, ReplayClient};
use crate::relay::transport::ConnectOptions;
use crate::relay::{PageEventKind, RealtimeEventRelay};
use crate::table::collection::PaginatedCollection;
use crate::table::controls::{self, ControlLabels, PageControl};
use crate::table::render::{self, MemoryDocument, MemoryElement, Sink};
use crate::table::{DataTable, TableIds};

fn products(n: usize) -> Vec<Value> {
    (1..=n)
        .map(|i| {
            let shop = if i % 3 == 0 { "Corner Tea" } else { "Leaf & Co" };
            json!({
                "id": i,
                "name": format!("Product {i}"),
                "price": i * 3,
                "active": i % 2 == 0,
                "shop": {"name": shop},
                "tags": ["new", format!("batch-{}", i % 4)],
            })
        })
        .collect()
}

fn page_numbers(items: &[PageControl]) -> Vec<usize> {
    items
        .iter()
        .filter_map(|c| match c {
            PageControl::Page { number, .. } => Some(*number),
            _ => None,
        })
        .collect()
}

#[test]
fn total_pages_and_slices_cover_every_item() {
    for n in [0usize, 1, 9, 10, 11, 37, 100] {
        for size in [1usize, 3, 10, 25] {
            let mut c = PaginatedCollection::new(products(n));
            c.set_page_size(NonZeroUsize::new(size).unwrap());
            assert_eq!(c.total_pages(), n.div_ceil(size), "n={n} size={size}");

            let mut seen = c.current_slice().len();
            for p in 2..=c.total_pages() {
                assert!(c.go_to_page(p));
                seen += c.current_slice().len();
            }
            assert_eq!(seen, n, "n={n} size={size}");
        }
    }
}

#[test]
fn out_of_range_pages_leave_the_page_unchanged() {
    let mut c = PaginatedCollection::new(products(25));
    assert!(c.go_to_page(2));
    for p in [0usize, 4, 99, usize::MAX] {
        assert!(!c.go_to_page(p));
        assert_eq!(c.page(), 2);
    }
}

#[test]
fn search_partitions_items_by_match() {
    let fields = ["name", "shop.name", "tags"];
    let mut c = PaginatedCollection::new(products(30));
    c.search("CORNER", &fields);

    let query = "corner";
    let matches = |item: &Value| {
        fields.iter().any(|f| {
            crate::table::accessor::resolve(item, f)
                .and_then(crate::table::accessor::searchable_text)
                .map(|s| s.to_lowercase().contains(query))
                .unwrap_or(false)
        })
    };
    let kept: Vec<&Value> = c.filtered().collect();
    assert_eq!(kept.len(), 10);
    assert!(kept.iter().all(|item| matches(*item)));
    let kept_ids: Vec<&Value> = kept.iter().map(|item| &item["id"]).collect();
    for item in c.all() {
        if !kept_ids.contains(&&item["id"]) {
            assert!(!matches(item));
        }
    }
}

#[test]
fn empty_search_restores_everything_on_page_one() {
    let mut c = PaginatedCollection::new(products(30));
    c.search("batch-1", &["tags"]);
    assert_eq!(c.filtered_len(), 8);
    c.search("", &["tags"]);
    assert_eq!(c.filtered_len(), 30);
    assert!(c.filtered().zip(c.all()).all(|(a, b)| a == b));
    assert_eq!(c.page(), 1);
}

#[test]
fn single_page_controls() {
    let items = controls::controls(1, 1, 5);
    assert_eq!(
        items,
        vec![
            PageControl::Previous {
                target: 0,
                disabled: true
            },
            PageControl::Page {
                number: 1,
                active: true
            },
            PageControl::Next {
                target: 2,
                disabled: true
            },
        ]
    );
}

#[test]
fn middle_page_controls_show_both_ellipses() {
    let items = controls::controls(5, 20, 5);
    assert_eq!(page_numbers(&items), vec![1, 3, 4, 5, 6, 7, 20]);
    assert_eq!(items[1], PageControl::Page { number: 1, active: false });
    assert_eq!(items[2], PageControl::Ellipsis);
    assert_eq!(items[items.len() - 3], PageControl::Ellipsis);
    assert_eq!(
        items[items.len() - 2],
        PageControl::Page {
            number: 20,
            active: false
        }
    );
}

#[test]
fn empty_password_scores_zero() {
    let v = password::evaluate("");
    assert_eq!(v.score, 0);
    assert_eq!(v.tier, Tier::Low);
    assert!(!v.valid);
}

#[test]
fn password_scores_grow_with_complexity() {
    let cases = [
        ("abcdefgh", 40, Tier::Low),
        ("Password12", 75, Tier::Middle),
        ("Abcdefgh1!", 85, Tier::High),
        ("Abcdefgh12!!xyzQ", 100, Tier::High),
    ];
    for (pw, score, tier) in cases {
        let v = password::evaluate(pw);
        assert_eq!(v.score, score, "{pw}");
        assert_eq!(v.tier, tier, "{pw}");
    }
    let c = password::evaluate("Abcdefgh1!").checks;
    assert!(c.length && c.uppercase && c.lowercase && c.digit && c.special);
}

#[test]
fn empty_slice_replaces_prior_content_with_one_placeholder() {
    let c: PaginatedCollection<Value> = PaginatedCollection::new(Vec::new());
    let mut sink = MemoryElement::default();
    sink.replace_markup("<tr><td>stale</td></tr><tr><td>rows</td></tr>");
    let rows = render::render(
        &c,
        &|_: &Value| -> String { unreachable!() },
        &ControlLabels::default(),
        &mut sink,
    );
    assert_eq!(rows, 0);
    assert_eq!(sink.markup.matches("<tr>").count(), 1);
    assert!(sink.markup.contains("No data"));
}

#[tokio::test]
async fn each_pushed_event_reaches_the_page_once_unmodified() {
    let recording: String = PageEventKind::ALL
        .iter()
        .enumerate()
        .map(|(i, kind)| {
            format!(
                "{{\"type\":\"message\",\"event\":\"{}\",\"payload\":{{\"id\":{i},\"items\":[1,2]}}}}\n",
                kind.wire_name()
            )
        })
        .collect();
    let client = ReplayClient::new(parse_recording(&recording).unwrap());
    let mut relay = RealtimeEventRelay::new(client, ConnectOptions::default());
    let mut page = relay.subscribe();
    let events = relay.start().unwrap();
    relay.run(events).await;

    for (i, kind) in PageEventKind::ALL.into_iter().enumerate() {
        let got = page.recv().await.unwrap();
        assert_eq!(got.kind, kind);
        assert_eq!(got.detail, json!({"id": i, "items": [1, 2]}));
    }
    assert!(page.try_recv().is_err());
}

#[test]
fn tables_on_one_page_keep_separate_state() {
    let mut doc = MemoryDocument::with_elements([
        "ordersBody",
        "ordersInfo",
        "ordersControls",
        "productsBody",
    ]);
    let ids = TableIds {
        body: "ordersBody".to_string(),
        info: "ordersInfo".to_string(),
        controls: "ordersControls".to_string(),
    };
    let row = |item: &Value| format!("<tr><td>{}</td></tr>", item["id"]);
    let mut orders = DataTable::new(ids, products(25), row);
    let mut items = DataTable::new(TableIds::new("productsBody"), products(4), row);
    orders.init(&mut doc);
    items.init(&mut doc);

    assert!(orders.change_page(&mut doc, 3));
    assert_eq!(items.collection().page(), 1);
    assert_eq!(doc.markup("ordersInfo"), "Showing 21-25 of 25");
    assert_eq!(doc.markup("productsBody").matches("<tr>").count(), 4);
    assert!(doc.markup("ordersControls").contains("data-page=\"2\""));

    items.search(&mut doc, "product 4", &["name"]);
    assert_eq!(doc.markup("productsBody"), "<tr><td>4</td></tr>");
    assert_eq!(orders.collection().filtered_len(), 25);
}

#[test]
fn filter_then_search_keeps_only_the_last() {
    let mut c = PaginatedCollection::new(products(12));
    c.filter(|item| item["active"] == json!(true));
    assert_eq!(c.filtered_len(), 6);
    c.search("leaf", &["shop.name"]);
    assert_eq!(c.filtered_len(), 8);
}

#[test]
fn field_filter_drives_a_data_table() {
    let mut doc = MemoryDocument::with_elements(["tableBody", "paginationInfo"]);
    let formatter = render::ColumnFormatter::new(vec!["id".to_string(), "shop.name".to_string()]);
    let mut table = DataTable::new(TableIds::new("tableBody"), products(9), formatter);
    table.init(&mut doc);

    let filter = crate::table::FieldFilter::parse("shop.name=^Corner").unwrap();
    table.filter(&mut doc, |item| filter.matches(item));
    assert_eq!(doc.markup("paginationInfo"), "Showing 1-3 of 3");
    assert!(doc.markup("tableBody").contains("<td>Corner Tea</td>"));
    assert!(!doc.markup("tableBody").contains("Leaf &amp; Co"));
}

#[tokio::test]
async fn long_replays_lose_no_page_events() {
    let recording: String = (0..150)
        .map(|i| format!("{{\"type\":\"message\",\"event\":\"new_order\",\"payload\":{{\"order_id\":{i}}}}}\n"))
        .collect();
    let client = ReplayClient::new(parse_recording(&recording).unwrap());
    let mut relay = RealtimeEventRelay::new(client, ConnectOptions::default());
    let mut page = relay.subscribe();
    let events = relay.start().unwrap();
    relay.run(events).await;

    let mut received = 0;
    while let Ok(event) = page.try_recv() {
        assert_eq!(event.detail, json!({"order_id": received}));
        received += 1;
    }
    assert_eq!(received, 150);
}
