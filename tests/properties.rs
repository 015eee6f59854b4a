// Property tests: date normalization, filter composition, writer equivalence

use proptest::prelude::*;

use report_taxonomy::filter::filter_owned;
use report_taxonomy::{
    filter, normalize, normalize_value, CanonicalDate, CsvWriter, DateInput, EmployeePeriod, FilterCriteria,
    OemSheet, PdfWriter, Record, ReportDraft, ReportKind, ReportStatus, ReportSubtype, ReportType, SchemaRegistry,
};

const DIVISIONS: [&str; 3] = ["Sales", "IT", "Marketing"];

fn arb_date() -> impl Strategy<Value = (i32, u32, u32)> {
    (1950i32..2100, 1u32..=12, 1u32..=28)
}

fn arb_status() -> impl Strategy<Value = ReportStatus> {
    prop_oneof![
        Just(ReportStatus::Draft),
        Just(ReportStatus::Submitted),
        Just(ReportStatus::Approved),
    ]
}

fn arb_division() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(DIVISIONS[0]), Just(DIVISIONS[1]), Just(DIVISIONS[2])]
}

fn arb_customer() -> impl Strategy<Value = (String, String, &'static str, ReportStatus, (i32, u32, u32))> {
    (
        "[A-Za-z]{1,8}",
        "[A-Za-z ,\"]{0,16}",
        arb_division(),
        arb_status(),
        arb_date(),
    )
}

fn build_records(specs: Vec<(String, String, &'static str, ReportStatus, (i32, u32, u32))>) -> Vec<Record> {
    specs
        .into_iter()
        .enumerate()
        .map(|(i, (name, title, division, status, (y, m, d)))| {
            ReportDraft::new(ReportKind::Customer)
                .with_title(title)
                .with_date(format!("{:04}-{:02}-{:02}", y, m, d))
                .with_status(status)
                .with_field("customerName", name)
                .unwrap()
                .with_field("landlineOrMobile", "555-0100")
                .unwrap()
                .with_field("division", division)
                .unwrap()
                .validate(SchemaRegistry::global())
                .unwrap()
                .into_record(format!("c{}", i))
        })
        .collect()
}

fn arb_kind() -> impl Strategy<Value = ReportKind> {
    prop_oneof![
        Just(ReportKind::Customer),
        Just(ReportKind::Visit),
        Just(ReportKind::Oem(OemSheet::Orders)),
        Just(ReportKind::Oem(OemSheet::LostTenders)),
        Just(ReportKind::Employee(EmployeePeriod::Daily)),
        Just(ReportKind::Employee(EmployeePeriod::Weekly)),
    ]
}

fn arb_subtype() -> impl Strategy<Value = ReportSubtype> {
    prop_oneof![
        Just(ReportSubtype::Orders),
        Just(ReportSubtype::LostTenders),
        Just(ReportSubtype::Daily),
        Just(ReportSubtype::Weekly),
        Just(ReportSubtype::None),
    ]
}

/// A submittable draft of `kind` with only its required fields set
fn mixed_record(index: usize, kind: ReportKind, name: &str, division: &str, date: (i32, u32, u32)) -> Record {
    let (y, m, d) = date;
    let required: &[(&str, &str)] = match kind {
        ReportKind::Customer => &[("landlineOrMobile", "555-0100")],
        ReportKind::Visit => &[("location", "Plant 2")],
        ReportKind::Oem(OemSheet::Orders) => &[("poNumber", "PO-7"), ("orderDate", "2024-02-01")],
        ReportKind::Oem(_) => &[("tenderNumber", "T-9")],
        _ => &[("employeeId", "E-1")],
    };

    let mut draft = ReportDraft::new(kind)
        .with_title(format!("{} report", name))
        .with_date(format!("{:04}-{:02}-{:02}", y, m, d));
    let name_field = match kind {
        ReportKind::Employee(_) => "employeeName",
        ReportKind::Oem(OemSheet::Orders) => "item",
        _ => "customerName",
    };
    draft.set_field(name_field, name).unwrap();
    for (field, value) in required {
        draft.set_field(field, *value).unwrap();
    }
    match kind {
        ReportKind::Customer => draft.set_field("division", division).unwrap(),
        ReportKind::Employee(_) => draft.set_field("department", division).unwrap(),
        _ => {}
    }

    draft
        .validate(SchemaRegistry::global())
        .unwrap()
        .into_record(format!("m{}", index))
}

fn build_mixed(specs: Vec<(ReportKind, String, &'static str, (i32, u32, u32))>) -> Vec<Record> {
    specs
        .into_iter()
        .enumerate()
        .map(|(i, (kind, name, division, date))| mixed_record(i, kind, &name, division, date))
        .collect()
}

fn arb_mixed() -> impl Strategy<Value = Vec<(ReportKind, String, &'static str, (i32, u32, u32))>> {
    prop::collection::vec((arb_kind(), "[A-Za-z]{1,8}", arb_division(), arb_date()), 0..30)
}

fn ids(records: &[Record]) -> Vec<String> {
    records.iter().map(|r| r.id().to_string()).collect()
}

proptest! {
    #[test]
    fn canonical_date_round_trips_through_iso((y, m, d) in arb_date()) {
        let date = normalize(&DateInput::from([y as i64, m as i64, d as i64])).unwrap();
        let again = normalize(&DateInput::from(date.to_iso().as_str())).unwrap();

        prop_assert_eq!(date, again);
        prop_assert_eq!(date.to_triple(), [y as i64, m as i64, d as i64]);
    }

    #[test]
    fn every_encoding_of_a_date_agrees((y, m, d) in arb_date()) {
        let expected = CanonicalDate::from_ymd(y, m, d).unwrap();

        let triple = normalize_value(&serde_json::json!([y, m, d])).unwrap();
        let iso = normalize_value(&serde_json::json!(format!("{:04}-{:02}-{:02}", y, m, d))).unwrap();
        let compact = normalize_value(&serde_json::json!(format!("{:04}{:02}{:02}", y, m, d))).unwrap();
        let us = normalize_value(&serde_json::json!(format!("{:02}/{:02}/{:04}", m, d, y))).unwrap();

        prop_assert_eq!(triple, expected);
        prop_assert_eq!(iso, expected);
        prop_assert_eq!(compact, expected);
        prop_assert_eq!(us, expected);
    }

    #[test]
    fn filtering_is_idempotent(
        specs in prop::collection::vec(arb_customer(), 0..20),
        division in arb_division(),
        status in arb_status(),
    ) {
        let records = build_records(specs);
        let criteria = FilterCriteria::new().with_department(division).with_status(status);

        let once = filter_owned(&records, &criteria);
        let twice = filter_owned(&once, &criteria);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn criteria_compose_with_and(
        specs in prop::collection::vec(arb_customer(), 0..20),
        division in arb_division(),
        status in arb_status(),
    ) {
        let records = build_records(specs);
        let by_division = FilterCriteria::new().with_department(division.to_lowercase());
        let by_status = FilterCriteria::new().with_status(status);
        let both = FilterCriteria::new().with_department(division.to_lowercase()).with_status(status);

        let sequential = filter_owned(&filter_owned(&records, &by_division), &by_status);
        let combined = filter_owned(&records, &both);
        prop_assert_eq!(ids(&sequential), ids(&combined));
    }

    #[test]
    fn filtering_preserves_input_order(
        specs in prop::collection::vec(arb_customer(), 0..20),
        (y, m, d) in arb_date(),
    ) {
        let records = build_records(specs);
        let from = CanonicalDate::from_ymd(y, m, d);
        let criteria = FilterCriteria::new().with_date_range(from, None);

        let kept = filter(&records, &criteria);
        let positions: Vec<usize> = kept
            .iter()
            .map(|r| records.iter().position(|x| x.id() == r.id()).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(kept.iter().all(|r| Some(r.date()) >= from));
    }

    #[test]
    fn csv_and_pdf_carry_the_same_cells(
        specs in prop::collection::vec(arb_customer(), 0..40),
        rows_per_page in 1usize..=32,
    ) {
        let records = build_records(specs);
        let table = report_taxonomy::project(&records, ReportKind::Customer);

        let csv_rows = CsvWriter::new().rows(&table).unwrap();
        let document = PdfWriter::new().with_rows_per_page(rows_per_page).layout(&table);

        let mut pdf_rows = vec![document.headers().to_vec()];
        pdf_rows.extend(document.rows());

        prop_assert_eq!(csv_rows, pdf_rows);
        prop_assert_eq!(document.page_count(), table.row_count().div_ceil(rows_per_page).max(1));
    }

    #[test]
    fn adding_a_subtype_narrows_a_type_filter(
        specs in arb_mixed(),
        subtype in arb_subtype(),
        division in arb_division(),
    ) {
        let records = build_mixed(specs);

        for report_type in [ReportType::Oem, ReportType::Employee, ReportType::Customer] {
            let by_type = FilterCriteria::new().with_type(report_type).with_department(division);
            let by_pair = by_type.clone().with_subtype(subtype);

            let wide = ids(&filter_owned(&records, &by_type));
            let narrow = ids(&filter_owned(&records, &by_pair));

            prop_assert!(narrow.iter().all(|id| wide.contains(id)));
            prop_assert_eq!(ids(&filter_owned(&filter_owned(&records, &by_pair), &by_pair)), narrow);
        }
    }

    #[test]
    fn type_filter_keeps_only_that_type(specs in arb_mixed()) {
        let records = build_mixed(specs);
        let oem = filter(&records, &FilterCriteria::new().with_type(ReportType::Oem));
        let orders = filter(
            &records,
            &FilterCriteria::new().with_type(ReportType::Oem).with_subtype(ReportSubtype::Orders),
        );

        prop_assert!(oem.iter().all(|r| r.report_type() == ReportType::Oem));
        prop_assert!(orders.iter().all(|r| r.kind() == ReportKind::Oem(OemSheet::Orders)));
        prop_assert_eq!(
            oem.len(),
            records.iter().filter(|r| matches!(r.kind(), ReportKind::Oem(_))).count()
        );
    }
}
