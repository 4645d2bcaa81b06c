use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::Utc;
use fieldstock_core::{ItemId, Location, SupplierId, VehicleId, WarehouseId};
use fieldstock_events::InMemoryEventBus;
use fieldstock_infra::{InMemoryLedgerStore, NewEntry, StockService};
use fieldstock_inventory::{
    InMemoryCatalog, InventoryItem, StockEvent, StockLocationItem, StockPolicy, UsageMetadata, scan,
};
use fieldstock_purchasing::{OrderNumbering, generate};
use std::sync::Arc;

const WAREHOUSES: usize = 4;
const VEHICLES: usize = 40;
const SUPPLIERS: usize = 12;

/// Synthetic ledger: every item stocked in every warehouse and on a slice of
/// the fleet, with roughly a third of locations at or below threshold.
fn build_ledger(item_count: usize) -> (InMemoryCatalog, Vec<StockLocationItem>) {
    let suppliers: Vec<SupplierId> = (0..SUPPLIERS).map(|_| SupplierId::new()).collect();
    let warehouses: Vec<WarehouseId> = (0..WAREHOUSES).map(|_| WarehouseId::new()).collect();
    let vehicles: Vec<VehicleId> = (0..VEHICLES).map(|_| VehicleId::new()).collect();
    let now = Utc::now();

    let catalog = InMemoryCatalog::new();
    let mut entries = Vec::with_capacity(item_count * (WAREHOUSES + 4));

    for i in 0..item_count {
        let mut item = InventoryItem::new(ItemId::new(), format!("Part {i}"), 100 + i as i64, 10);
        if i % 7 != 0 {
            item.supplier_id = Some(suppliers[i % SUPPLIERS]);
        }

        for (w, warehouse) in warehouses.iter().enumerate() {
            let quantity = ((i + w) % 30) as i64;
            entries.push(
                StockLocationItem::new(
                    item.id,
                    Location::Warehouse(*warehouse),
                    quantity,
                    0,
                    None,
                    now,
                )
                .unwrap(),
            );
        }
        for v in 0..4 {
            let vehicle = vehicles[(i + v * 11) % VEHICLES];
            let quantity = ((i * 3 + v) % 9) as i64;
            entries.push(
                StockLocationItem::new(
                    item.id,
                    Location::Vehicle(vehicle),
                    quantity,
                    3,
                    Some(8),
                    now,
                )
                .unwrap(),
            );
        }

        catalog.upsert(item).unwrap();
    }

    (catalog, entries)
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("replenishment_scan");

    for item_count in [100, 1_000, 10_000].iter() {
        let (catalog, entries) = build_ledger(*item_count);
        group.throughput(Throughput::Elements(entries.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(item_count), item_count, |b, _| {
            b.iter(|| black_box(scan(black_box(&entries), &catalog)));
        });
    }

    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("purchase_order_generation");
    let policy = StockPolicy::default();
    let numbering = OrderNumbering::default();

    for item_count in [100, 1_000, 10_000].iter() {
        let (catalog, entries) = build_ledger(*item_count);
        let report = scan(&entries, &catalog);
        group.throughput(Throughput::Elements(report.warehouse.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(item_count), item_count, |b, _| {
            b.iter(|| {
                black_box(generate(
                    black_box(&report.warehouse),
                    &entries,
                    &policy,
                    &numbering,
                    Utc::now(),
                ))
                .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_usage_latency(c: &mut Criterion) {
    let item = InventoryItem::new(ItemId::new(), "Bench part", 100, 0);
    let service = StockService::new(
        InMemoryLedgerStore::new(),
        InMemoryCatalog::with_items([item.clone()]),
        Arc::new(InMemoryEventBus::<StockEvent>::new()),
    );
    let entry = service
        .stock_item(NewEntry {
            item_id: item.id,
            location: Location::Warehouse(WarehouseId::new()),
            quantity: i64::MAX / 2,
            minimum_stock_level: 0,
            maximum_stock_level: None,
        })
        .unwrap();

    c.bench_function("record_usage_latency", |b| {
        b.iter(|| {
            service
                .record_usage(
                    black_box(entry.item_id()),
                    1,
                    entry.location(),
                    UsageMetadata::default(),
                )
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_scan, bench_generate, bench_usage_latency);
criterion_main!(benches);
