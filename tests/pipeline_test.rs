//! End-to-end tests: export text in, catalog file out.

mod common;

use std::time::Duration;

use cardcat::config::Config;
use cardcat::engine::EngineConfig;
use cardcat::event::{EventKind, Level, MemorySink};
use cardcat::lookup::LookupError;
use cardcat::model::{CanonicalRecord, Money};
use cardcat::pipeline::Pipeline;
use common::{HEADER_LINE, ScriptedLookup, Step, export_line, export_with_cards};
use rust_decimal::Decimal;

fn fast() -> EngineConfig {
    EngineConfig {
        dispatch_stagger: Duration::ZERO,
        retry_backoff: Duration::ZERO,
    }
}

#[tokio::test]
async fn lightning_bolt_end_to_end() {
    let mut card = CanonicalRecord::new("Lightning Bolt", "lea", "1");
    card.set_name = "Limited Edition Alpha".into();
    card.type_line = Some("Instant".into());
    card.price = Some(Money::usd(Decimal::new(45000, 2)));
    let lookup = ScriptedLookup::new().script("Lightning Bolt", vec![Step::Cards(vec![card])]);
    let sink = MemorySink::new();
    let text = "Name,Set,...\nLightning Bolt,LEA,Limited Edition Alpha,1,foil,Common,2,,,,,,,,\n";

    let output = Pipeline::new(&lookup, &sink).engine(fast()).run(text).await.unwrap();

    assert_eq!(output.catalog.rows, 1);
    let lines: Vec<_> = output.catalog.text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("\"lea-1-lightning-bolt\",\"Lightning Bolt (Limited Edition Alpha)\""));
    assert!(lines[1].contains("\"Foil\""));

    let keys = &lookup.calls()[0];
    assert_eq!(keys[0].set_code.as_deref(), Some("LEA"));
    assert_eq!(keys[0].collector_number.as_deref(), Some("1"));
}

#[tokio::test]
async fn large_export_is_split_into_full_batches() {
    let lookup = ScriptedLookup::new();
    let sink = MemorySink::new();

    let output = Pipeline::new(&lookup, &sink)
        .engine(fast())
        .run(&export_with_cards(160))
        .await
        .unwrap();

    let sizes: Vec<_> = lookup.calls().iter().map(Vec::len).collect();
    let mut sorted = sizes.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![10, 75, 75]);
    assert_eq!(output.run.state.total_batches, 3);
    assert_eq!(output.catalog.rows, 160);
}

#[tokio::test]
async fn oversized_batch_size_is_capped_at_the_endpoint_limit() {
    let lookup = ScriptedLookup::new();
    let sink = MemorySink::new();

    let output = Pipeline::new(&lookup, &sink)
        .batch_size(100)
        .engine(fast())
        .run(&export_with_cards(160))
        .await
        .unwrap();

    assert!(lookup.calls().iter().all(|keys| keys.len() <= 75));
    assert_eq!(output.run.state.total_batches, 3);
}

#[tokio::test]
async fn skipped_lines_and_failed_batches_are_reported() {
    let text = format!(
        "{HEADER_LINE}\n{}\nshort,line\n{}\n",
        export_line("Opt", "XLN", "65", "normal", "1"),
        export_line("Shock", "M19", "156", "normal", "4"),
    );
    let lookup = ScriptedLookup::new()
        .script("Shock", vec![Step::Fail(LookupError::Malformed("empty body".into()))]);
    let sink = MemorySink::new();

    let output = Pipeline::new(&lookup, &sink)
        .batch_size(1)
        .engine(fast())
        .run(&text)
        .await
        .unwrap();

    assert_eq!(output.skipped.len(), 1);
    assert_eq!(output.skipped[0].line, 3);
    assert_eq!(output.run.state.failures.len(), 1);
    assert_eq!(output.catalog.rows, 1);

    let events = sink.events();
    assert!(matches!(events[0].kind, EventKind::InputRowSkipped { line: 3, .. }));
    assert_eq!(
        events[1].kind,
        EventKind::InputParsed {
            accepted: 2,
            skipped: 1
        }
    );
    assert!(matches!(
        events.last().unwrap().kind,
        EventKind::CatalogWritten { rows: 1 }
    ));
    for pair in events.windows(2) {
        assert_eq!(pair[1].seq, pair[0].seq + 1);
    }
}

#[tokio::test]
async fn empty_export_yields_empty_catalog_and_error_event() {
    let lookup = ScriptedLookup::new();
    let sink = MemorySink::new();

    let output = Pipeline::new(&lookup, &sink)
        .engine(fast())
        .run(HEADER_LINE)
        .await
        .unwrap();

    assert!(output.catalog.is_empty());
    assert_eq!(lookup.call_count(), 0);
    assert_eq!(output.run.state.total_batches, 0);
    assert!(sink.events().iter().any(|e| e.kind == EventKind::CatalogEmpty));
    assert_eq!(sink.count(Level::Error), 1);
}

#[tokio::test]
async fn every_batch_failing_still_completes_with_empty_catalog() {
    let lookup = ScriptedLookup::new()
        .script("Card 0", vec![Step::Fail(LookupError::Transport("down".into()))])
        .script("Card 2", vec![Step::Fail(LookupError::Transport("down".into()))]);
    let sink = MemorySink::new();

    let output = Pipeline::new(&lookup, &sink)
        .batch_size(2)
        .engine(fast())
        .run(&export_with_cards(4))
        .await
        .unwrap();

    assert_eq!(output.run.state.completed_batches, 2);
    assert_eq!(output.run.state.failures.len(), 2);
    assert!(output.catalog.is_empty());
    assert!(output.run.completed_at.is_some());
}

#[tokio::test]
async fn pipeline_from_config_uses_configured_batch_size() {
    let config = Config::from_toml_str(
        "batch_size = 3\ndispatch_stagger_ms = 0\nretry_backoff_ms = 0",
    )
    .unwrap();
    let lookup = ScriptedLookup::new();
    let sink = MemorySink::new();

    let output = Pipeline::from_config(&config, &lookup, &sink)
        .run(&export_with_cards(7))
        .await
        .unwrap();

    assert_eq!(output.run.state.total_batches, 3);
    assert_eq!(lookup.call_count(), 3);
}
