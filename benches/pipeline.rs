use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rxscan::{
    compare, parse, parse_scan_text, EpcisShipmentFields, ParseConfig, RawScanInput, ScanSource,
};

const BRACKETED: &str = "(01)00312345678906(17)220615(10)ABC123(21)XYZ987";
const WEDGE: &str = "0103090123456789211000000592140291726093010ABC";

fn parse_bench(c: &mut Criterion) {
    let cfg = ParseConfig::default();
    c.bench_function("parse_bracketed_element_string", |b| {
        let raw = RawScanInput::new(BRACKETED, ScanSource::Camera);
        b.iter(|| {
            let parsed = parse(black_box(&raw), &cfg);
            black_box(parsed);
        });
    });
}

fn correction_bench(c: &mut Criterion) {
    c.bench_function("correct_and_parse_wedge_scan", |b| {
        b.iter(|| {
            let parsed = parse_scan_text(black_box(WEDGE), ScanSource::HardwareScanner);
            black_box(parsed);
        });
    });
}

fn compare_bench(c: &mut Criterion) {
    let scanned = parse_scan_text(BRACKETED, ScanSource::Camera);
    let on_file = EpcisShipmentFields {
        gtin: "50312345678901".into(),
        lot_number: Some("ABC123".into()),
        expiration_date: None,
        serial_number: None,
    }
    .to_identifier();

    c.bench_function("compare_case_vs_item", |b| {
        b.iter(|| {
            let verdict = compare(black_box(&scanned), black_box(&on_file));
            black_box(verdict);
        });
    });
}

criterion_group!(benches, parse_bench, correction_bench, compare_bench);
criterion_main!(benches);
