use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use memberbill_core::{AggregateId, Money, RoundingIncrement};
use memberbill_invoicing::{Invoice, InvoiceId, LineItem, LineItemKind, VatRate};

fn invoice_with_items(count: usize) -> (Invoice, Vec<LineItem>) {
    let invoice = Invoice::new(InvoiceId::new(AggregateId::new()), "Benchmark");
    let items = (0..count)
        .map(|i| {
            let mut item = LineItem::new(invoice.id_typed(), LineItemKind::Static, format!("Item {i}"))
                .with_unit_cost(Money::new(Decimal::new(990 + i as i64, 2)))
                .with_count((i % 7 + 1) as u32)
                .with_vat_rate(VatRate::new(Decimal::new(77, 1)));
            item.recalculate();
            item
        })
        .collect();
    (invoice, items)
}

fn bench_line_item_total(c: &mut Criterion) {
    let (_, items) = invoice_with_items(1);
    let item = &items[0];

    c.bench_function("line_item_total", |b| b.iter(|| black_box(item).total()));
}

fn bench_invoice_recalculation(c: &mut Criterion) {
    let mut group = c.benchmark_group("invoice_recalculation");
    let at = chrono::Utc::now();

    for size in [10usize, 100, 1_000] {
        let (invoice, items) = invoice_with_items(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &items, |b, items| {
            b.iter(|| {
                let mut invoice = invoice.clone();
                invoice
                    .recalculate(black_box(items), RoundingIncrement::cents(), at)
                    .unwrap();
                invoice.total()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_line_item_total, bench_invoice_recalculation);
criterion_main!(benches);
