use super::*;

fn text(s: &str) -> Option<RawValue> {
    Some(RawValue::Text(s.to_string()))
}

fn num(n: f64) -> Option<RawValue> {
    Some(RawValue::Number(n))
}

fn raw(title: &str) -> RawRecord {
    RawRecord {
        source: "Flipkart".to_string(),
        title: Some(title.to_string()),
        price: text("₹52,999"),
        rating: num(4.4),
        reviews: num(1200.0),
        ..RawRecord::default()
    }
}

// ---------------------------------------------------------------------------
// normalize_record: happy path and field sources
// ---------------------------------------------------------------------------

#[test]
fn normalizes_complete_row() {
    let mut row = raw("  Google Pixel 8 (Obsidian, 128 GB)  ");
    row.link = Some("https://www.flipkart.com/pixel-8/p/itm123".to_string());
    row.image_url = Some("https://img.example/pixel.jpg".to_string());

    let record = normalize_record(row, RatingPolicy::Lenient).expect("row is valid");
    assert_eq!(record.name, "Google Pixel 8 (Obsidian, 128 GB)");
    assert_eq!(record.price, 52_999.0);
    assert_eq!(record.raw_price, "₹52,999");
    assert_eq!(record.rating, 4.4);
    assert_eq!(record.reviews, 1200);
    assert_eq!(record.source, "Flipkart");
    assert!(record.link.is_some());
    assert!(record.image_ref.is_some());
}

#[test]
fn numeric_price_keeps_display_text() {
    let mut row = raw("Pixel 8");
    row.price = num(52_999.0);
    let record = normalize_record(row, RatingPolicy::Lenient).unwrap();
    assert_eq!(record.price, 52_999.0);
    assert_eq!(record.raw_price, "52999");
}

#[test]
fn price_falls_back_to_snippet_then_title() {
    let mut row = raw("Pixel 8");
    row.price = text("0");
    row.snippet = Some("Deal price ₹ 49,999 with bank offers".to_string());
    let record = normalize_record(row, RatingPolicy::Lenient).unwrap();
    assert_eq!(record.price, 49_999.0);
    assert_eq!(record.raw_price, "₹ 49,999");

    let mut row = raw("Pixel 8 at Rs. 47,999");
    row.price = None;
    row.snippet = Some("Free delivery".to_string());
    let record = normalize_record(row, RatingPolicy::Lenient).unwrap();
    assert_eq!(record.price, 47_999.0);
}

#[test]
fn rating_and_reviews_fall_back_to_snippet() {
    let mut row = raw("Pixel 8");
    row.rating = None;
    row.reviews = None;
    row.snippet = Some("4.3 out of 5 stars, 8,765 ratings".to_string());
    let record = normalize_record(row, RatingPolicy::Lenient).unwrap();
    assert_eq!(record.rating, 4.3);
    assert_eq!(record.reviews, 8765);
}

#[test]
fn textual_rating_and_reviews_are_parsed() {
    let mut row = raw("Pixel 8");
    row.rating = text("4.2 out of 5");
    row.reviews = text("3,210");
    let record = normalize_record(row, RatingPolicy::Lenient).unwrap();
    assert_eq!(record.rating, 4.2);
    assert_eq!(record.reviews, 3210);
}

#[test]
fn missing_reviews_default_to_zero() {
    let mut row = raw("Pixel 8");
    row.reviews = None;
    let record = normalize_record(row, RatingPolicy::Lenient).unwrap();
    assert_eq!(record.reviews, 0);
}

// ---------------------------------------------------------------------------
// normalize_record: drop reasons
// ---------------------------------------------------------------------------

#[test]
fn missing_or_blank_name_is_dropped() {
    let mut row = raw("x");
    row.title = None;
    assert_eq!(
        normalize_record(row, RatingPolicy::Lenient),
        Err(DropReason::MissingName)
    );

    let row = raw("   ");
    assert_eq!(
        normalize_record(row, RatingPolicy::Lenient),
        Err(DropReason::MissingName)
    );
}

#[test]
fn missing_price_is_dropped() {
    let mut row = raw("Pixel 8");
    row.price = None;
    assert_eq!(
        normalize_record(row, RatingPolicy::Lenient),
        Err(DropReason::MissingPrice)
    );
}

#[test]
fn unparseable_price_is_invalid() {
    let mut row = raw("Pixel 8");
    row.price = text("Price on request");
    assert_eq!(
        normalize_record(row, RatingPolicy::Lenient),
        Err(DropReason::InvalidPrice)
    );
}

#[test]
fn negative_price_is_invalid() {
    let mut row = raw("Pixel 8");
    row.price = num(-10.0);
    assert_eq!(
        normalize_record(row, RatingPolicy::Lenient),
        Err(DropReason::InvalidPrice)
    );
}

#[test]
fn zero_price_text_counts_as_missing() {
    let mut row = raw("Pixel 8");
    row.price = text("₹0.00");
    assert_eq!(
        normalize_record(row, RatingPolicy::Lenient),
        Err(DropReason::MissingPrice)
    );
}

#[test]
fn out_of_range_rating_is_invalid() {
    let mut row = raw("Pixel 8");
    row.rating = num(7.5);
    assert_eq!(
        normalize_record(row, RatingPolicy::Lenient),
        Err(DropReason::InvalidRating)
    );
}

#[test]
fn unparseable_rating_text_is_invalid() {
    let mut row = raw("Pixel 8");
    row.rating = text("great");
    assert_eq!(
        normalize_record(row, RatingPolicy::Lenient),
        Err(DropReason::InvalidRating)
    );
}

#[test]
fn missing_rating_depends_on_policy() {
    let mut row = raw("Pixel 8");
    row.rating = None;
    let lenient = normalize_record(row.clone(), RatingPolicy::Lenient).unwrap();
    assert_eq!(lenient.rating, 0.0);

    assert_eq!(
        normalize_record(row, RatingPolicy::Strict),
        Err(DropReason::MissingRating)
    );
}

#[test]
fn fractional_review_count_is_invalid() {
    let mut row = raw("Pixel 8");
    row.reviews = num(12.5);
    assert_eq!(
        normalize_record(row, RatingPolicy::Lenient),
        Err(DropReason::InvalidReviews)
    );
}

#[test]
fn negative_review_count_is_invalid() {
    let mut row = raw("Pixel 8");
    row.reviews = text("-4");
    assert_eq!(
        normalize_record(row, RatingPolicy::Lenient),
        Err(DropReason::InvalidReviews)
    );
}

// ---------------------------------------------------------------------------
// normalize_records
// ---------------------------------------------------------------------------

#[test]
fn batch_keeps_order_and_tallies_drops() {
    let mut no_price = raw("No price");
    no_price.price = None;
    let mut no_name = raw("x");
    no_name.title = None;
    let mut also_no_price = raw("Also no price");
    also_no_price.price = text("");

    let report = normalize_records(
        vec![
            raw("First"),
            no_price,
            raw("Second"),
            no_name,
            also_no_price,
        ],
        RatingPolicy::Lenient,
    );

    let names: Vec<&str> = report.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["First", "Second"]);
    assert_eq!(report.dropped.get(&DropReason::MissingPrice), Some(&2));
    assert_eq!(report.dropped.get(&DropReason::MissingName), Some(&1));
    assert_eq!(report.dropped_total(), 3);
}

#[test]
fn batch_output_never_exceeds_input() {
    let rows = vec![raw("A"), raw("B"), RawRecord::default()];
    let report = normalize_records(rows, RatingPolicy::Strict);
    assert_eq!(report.records.len() + report.dropped_total(), 3);
    assert!(report
        .records
        .iter()
        .all(|r| !r.name.is_empty() && r.price > 0.0 && (0.0..=5.0).contains(&r.rating)));
}

#[test]
fn empty_batch_is_empty_report() {
    let report = normalize_records(Vec::new(), RatingPolicy::Lenient);
    assert!(report.records.is_empty());
    assert_eq!(report.dropped_total(), 0);
}
