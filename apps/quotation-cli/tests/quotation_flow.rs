//! End-to-end quotation flows against a file-backed database.

use furnisure_core::{AmountInput, BillTo, DocumentNumber, LineItemInput, Money, QuotationInput};
use furnisure_db::{Database, DbConfig};
use furnisure_quotations::commands::import::{import_legacy, LegacyQuotation};
use furnisure_quotations::commands::quotation::{
    create_quotation, peek_next_number, render_quotation,
};
use furnisure_quotations::config::AppConfig;
use furnisure_quotations::error::ErrorCode;
use furnisure_quotations::state::AppState;
use tempfile::TempDir;

async fn file_state(dir: &TempDir) -> AppState {
    let config = DbConfig::new(dir.path().join("quotations.db")).max_connections(8);
    let db = Database::new(config).await.unwrap();
    AppState::new(db, AppConfig::default())
}

fn request(date: &str, price: &str, quantity: i64) -> QuotationInput {
    QuotationInput {
        quotation_date: Some(date.to_string()),
        bill_to: BillTo {
            name: "Meera Interiors".to_string(),
            ..Default::default()
        },
        items: vec![LineItemInput {
            description: Some("Teak sofa".to_string()),
            price: Some(AmountInput::Text(price.to_string())),
            quantity: Some(AmountInput::Text(quantity.to_string())),
        }],
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_get_distinct_consecutive_numbers() {
    let dir = TempDir::new().unwrap();
    let state = file_state(&dir).await;

    let mut handles = Vec::new();
    for _ in 0..40 {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            create_quotation(&state, request("2021-06-10", "170.00", 4))
                .await
                .unwrap()
        }));
    }

    let mut sequences = Vec::new();
    for handle in handles {
        let q = handle.await.unwrap();
        assert!(q.number.ends_with("-21-22"));
        sequences.push(DocumentNumber::parse(&q.number).unwrap().sequence);
    }

    sequences.sort_unstable();
    assert_eq!(sequences, (1..=40).collect::<Vec<u64>>());
}

#[tokio::test]
async fn numbers_survive_reopen() {
    let dir = TempDir::new().unwrap();

    let state = file_state(&dir).await;
    let first = create_quotation(&state, request("2021-03-31", "10", 1))
        .await
        .unwrap();
    assert_eq!(first.number, "CE0001-20-21");
    state.db().close().await;

    let state = file_state(&dir).await;
    let second = create_quotation(&state, request("2021-04-01", "10", 1))
        .await
        .unwrap();
    assert_eq!(second.number, "CE0002-21-22");
}

#[tokio::test]
async fn counter_failure_persists_nothing() {
    let dir = TempDir::new().unwrap();
    let state = file_state(&dir).await;
    state.db().close().await;

    let err = create_quotation(&state, request("2021-06-10", "170", 4))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CounterUnavailable);

    let reopened = file_state(&dir).await;
    assert_eq!(reopened.db().quotations().count().await.unwrap(), 0);
}

#[tokio::test]
async fn import_moves_counter_past_legacy_numbers() {
    let dir = TempDir::new().unwrap();
    let state = file_state(&dir).await;

    let records: Vec<LegacyQuotation> = serde_json::from_value(serde_json::json!([
        {
            "quotationNumber": "CE0016-21-22",
            "quotationDate": "2021-07-01T00:00:00.000Z",
            "billTo": { "name": "Asha Traders" },
            "items": [{ "description": "Sofa", "price": 170, "quantity": 4 }],
            "subtotal": 680,
            "cgstPercent": 9,
            "cgstAmount": 61.199999999999996,
            "sgstAmount": 61.199999999999996,
            "grandTotal": 802.4
        },
        {
            "quotationNumber": "CE0009-21-22",
            "quotationDate": "2021-05-01",
            "items": [{ "description": "Chair", "price": "100", "quantity": 2 }]
        }
    ]))
    .unwrap();

    let report = import_legacy(&state, records).await.unwrap();
    assert_eq!(report.imported, 2);
    assert_eq!(report.counter_value, 16);

    let preview = peek_next_number(&state, chrono::NaiveDate::from_ymd_opt(2021, 8, 1))
        .await
        .unwrap();
    assert_eq!(preview.number, "CE0017-21-22");

    let next = create_quotation(&state, request("2021-08-01", "1", 1))
        .await
        .unwrap();
    assert_eq!(next.number, "CE0017-21-22");

    // Importing the same records again collides on the number
    let again: Vec<LegacyQuotation> = serde_json::from_value(serde_json::json!([{
        "quotationNumber": "CE0016-21-22",
        "quotationDate": "2021-07-01",
        "items": [{ "description": "Sofa", "price": 170, "quantity": 4 }]
    }]))
    .unwrap();
    let err = import_legacy(&state, again).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicateNumber);
}

#[tokio::test]
async fn legacy_record_without_totals_renders_recomputed() {
    let dir = TempDir::new().unwrap();
    let state = file_state(&dir).await;

    let records: Vec<LegacyQuotation> = serde_json::from_value(serde_json::json!([{
        "quotationNumber": "CE0003-20-21",
        "quotationDate": "2020-11-20",
        "items": [{ "description": "Sofa", "price": 170, "quantity": 4 }]
    }]))
    .unwrap();
    import_legacy(&state, records).await.unwrap();

    let stored = state
        .db()
        .quotations()
        .find_by_number("CE0003-20-21")
        .await
        .unwrap()
        .unwrap();
    assert!(stored.totals.is_empty());

    let page = render_quotation(&state, &stored.id).await.unwrap();
    assert_eq!(page.total_due(), Money::from_paise(80240));
    assert_eq!(
        serde_json::to_value(page.totals_source).unwrap(),
        serde_json::json!("RECOMPUTED")
    );
}

#[tokio::test]
async fn legacy_record_with_partial_totals_prints_what_it_stored() {
    let dir = TempDir::new().unwrap();
    let state = file_state(&dir).await;

    // The legacy form left SGST out of both the record and the grand total
    let records: Vec<LegacyQuotation> = serde_json::from_value(serde_json::json!([{
        "quotationNumber": "CE0005-21-22",
        "quotationDate": "2021-09-14",
        "items": [{ "description": "Sofa", "price": 170, "quantity": 4 }],
        "subtotal": 680,
        "cgstAmount": 61.2,
        "grandTotal": 741.2
    }]))
    .unwrap();
    import_legacy(&state, records).await.unwrap();

    let stored = state
        .db()
        .quotations()
        .find_by_number("CE0005-21-22")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.totals.grand_total, Some(Money::from_paise(74120)));
    assert_eq!(stored.totals.sgst_amount, None);

    let page = render_quotation(&state, &stored.id).await.unwrap();
    assert_eq!(page.totals.subtotal, Money::from_paise(68000));
    assert_eq!(page.totals.cgst_amount, Money::from_paise(6120));
    assert_eq!(page.totals.sgst_amount, Money::from_paise(6120));
    assert_eq!(page.total_due(), Money::from_paise(74120));
    assert_eq!(
        serde_json::to_value(page.totals_source).unwrap(),
        serde_json::json!("PARTIAL")
    );
}
