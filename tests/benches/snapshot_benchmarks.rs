//! # SupplyTrack Snapshot Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | st-02 projections | `derive_markers` over large partner/order sets |
//! | st-02 projections | `ShipmentSummary::from_orders` |
//! | st-02 units | decimal price ↔ smallest unit |

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shared_types::{
    Coordinates, Order, Partner, PartnerType, RequestStatus, ShipmentStatus, TransportType,
    WalletAddress,
};
use st_02_chain_sync::domain::units::{format_units, parse_units};
use st_02_chain_sync::{derive_markers, ShipmentSummary};

fn fixtures(n: usize) -> (Vec<Partner>, Vec<Order>) {
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default();
    let wallet = WalletAddress::parse(&format!("0x{}", "ab".repeat(20))).unwrap();

    let partners = (0..n)
        .map(|i| Partner {
            id: format!("P-{i}"),
            name: format!("Partner {i}"),
            partner_type: if i % 2 == 0 {
                PartnerType::Exporter
            } else {
                PartnerType::Importer
            },
            position: Coordinates::new((i % 90) as f64, (i % 180) as f64).unwrap(),
            wallet_address: wallet.clone(),
            created_at: date,
        })
        .collect();

    let orders = (0..n)
        .map(|i| Order {
            id: format!("ORD-{i}"),
            supplier_id: format!("P-{}", i / 2),
            product_id: "PROD".into(),
            order_date: date,
            delivery_date: None,
            price: Some(1.0),
            is_paid: false,
            shipment_status: if i % 3 == 0 {
                ShipmentStatus::InTransit
            } else {
                ShipmentStatus::Pending
            },
            request_status: RequestStatus::Approved,
            carrier_id: Some(format!("C-{i}")),
            transport_type: TransportType::Truck,
        })
        .collect();

    (partners, orders)
}

fn bench_markers(c: &mut Criterion) {
    let mut group = c.benchmark_group("st-02-projections");
    let user = Coordinates::new(40.7128, -74.006).unwrap();

    for size in [100usize, 1_000] {
        let (partners, orders) = fixtures(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("derive_markers", size), &size, |b, _| {
            b.iter(|| derive_markers(black_box(Some(&user)), &partners, &orders))
        });
        group.bench_with_input(BenchmarkId::new("summary", size), &size, |b, _| {
            b.iter(|| ShipmentSummary::from_orders(black_box(&orders)))
        });
    }
    group.finish();
}

fn bench_units(c: &mut Criterion) {
    let mut group = c.benchmark_group("st-02-units");
    group.bench_function("parse_units", |b| {
        b.iter(|| parse_units(black_box("1234.567890123456789"), 18))
    });
    let value = parse_units("1234.567890123456789", 18).unwrap_or_default();
    group.bench_function("format_units", |b| b.iter(|| format_units(black_box(value), 18)));
    group.finish();
}

criterion_group!(benches, bench_markers, bench_units);
criterion_main!(benches);
