use rxscan::{
    accept_scan, parse_scan_text, reconcile, validate, EpcisShipmentFields, ScanFormat, ScanSource,
};

#[test]
fn garbage_inputs_never_panic_and_decode_nothing() {
    let cases = [
        "",
        "   \n\t ",
        "lorem ipsum dolor",
        "(((((",
        "()()()",
        "{\"gtin\":",
        "urn:epc:id:sgtin:not.even.close.extra",
        "\u{1d}\u{1d}\u{1d}",
        "01",
        "(99)12345",
    ];

    for text in cases {
        for source in [
            ScanSource::Camera,
            ScanSource::HardwareScanner,
            ScanSource::Manual,
            ScanSource::Clipboard,
        ] {
            let parsed = parse_scan_text(text, source);
            assert!(
                parsed.gtin.is_none(),
                "no gtin should decode from {text:?}"
            );
        }
    }
}

#[test]
fn invalid_check_digit_parses_with_warning_not_error() {
    // 00312345678905 fails mod-10 validation but still parses; callers
    // decide whether to reject.
    let parsed = parse_scan_text("(01)00312345678905", ScanSource::Camera);
    assert_eq!(parsed.gtin.as_deref(), Some("00312345678905"));
    assert!(!validate("00312345678905"));
}

#[test]
fn partial_scans_keep_what_they_found() {
    let parsed = parse_scan_text("(01)00312345678906(17)221399", ScanSource::Camera);
    // The month 13 expiration is impossible and stays empty; the GTIN is
    // kept.
    assert_eq!(parsed.gtin.as_deref(), Some("00312345678906"));
    assert!(parsed.expiration_date.is_none());
    assert!(!parsed.is_empty());
}

#[test]
fn empty_identifiers_reconcile_to_zero_without_error() {
    let empty = parse_scan_text("nothing to see", ScanSource::Manual);
    assert_eq!(empty.format, ScanFormat::Unrecognized);

    let record = EpcisShipmentFields {
        gtin: "00312345678906".into(),
        lot_number: Some("L1".into()),
        expiration_date: None,
        serial_number: None,
    };
    let verdict = reconcile(&empty, &record);
    assert_eq!(verdict.confidence, 0);
    assert!(!verdict.same_company);
    assert!(!accept_scan(&empty, &record));
}

#[test]
fn malformed_on_file_gtin_reconciles_to_zero() {
    let parsed = parse_scan_text("(01)00312345678906", ScanSource::Camera);
    let record = EpcisShipmentFields {
        gtin: "not-a-gtin".into(),
        lot_number: None,
        expiration_date: None,
        serial_number: None,
    };
    let verdict = reconcile(&parsed, &record);
    assert_eq!(verdict.confidence, 0);
}
