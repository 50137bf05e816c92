mod common;

use tpm_report::{DEFAULT_HIGHLIGHT, Error, ReportConfig, ReportRequest, ReportType, parse_hex_color};

#[test]
fn report_type_parses_names_and_aliases() {
    assert_eq!("phase1".parse::<ReportType>().unwrap(), ReportType::Phase1);
    assert_eq!(" Phase2 ".parse::<ReportType>().unwrap(), ReportType::Phase2);
    assert_eq!("FASE3".parse::<ReportType>().unwrap(), ReportType::Phase3);
    assert!(matches!("phase4".parse::<ReportType>(), Err(Error::InvalidInput(_))));
    assert!(matches!("".parse::<ReportType>(), Err(Error::InvalidInput(_))));
}

#[test]
fn field_tables_are_ordered_per_phase() {
    let keys = |t: ReportType| t.field_table().iter().map(|f| f.key).collect::<Vec<_>>();
    assert_eq!(
        keys(ReportType::Phase1),
        ["contexto", "negocio", "regras", "especialista", "coisas"]
    );
    assert_eq!(
        keys(ReportType::Phase2),
        ["l6_display", "l5_abstraction", "l4_storage", "l3_border", "l2_connectivity", "l1_sensor"]
    );
    assert_eq!(
        keys(ReportType::Phase3),
        ["impl_l1", "impl_l2", "impl_l3", "impl_l4", "impl_l5", "impl_l6"]
    );
}

#[test]
fn only_phase_one_takes_attachments() {
    assert!(ReportType::Phase1.accepts_attachments());
    assert!(!ReportType::Phase2.accepts_attachments());
    assert!(!ReportType::Phase3.accepts_attachments());
    assert!(ReportType::Phase1.caption().is_none());
    assert!(ReportType::Phase2.caption().is_some());
}

#[test]
fn request_rejects_empty_keys() {
    let fields = common::fields(&[("contexto", "x"), (" ", "y")]);
    let err = ReportRequest::new(ReportType::Phase1, "P", "R", fields).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn request_keeps_unknown_keys() {
    let fields = common::fields(&[("contexto", "x"), ("unrelated", "y")]);
    let request = ReportRequest::new(ReportType::Phase1, "P", "R", fields).unwrap();
    assert_eq!(request.field("contexto"), Some("x"));
    assert_eq!(request.field("negocio"), None);
}

#[test]
fn hex_colors() {
    assert_eq!(parse_hex_color("2980b9"), Some(DEFAULT_HIGHLIGHT));
    assert_eq!(parse_hex_color("#FF0000"), Some([255, 0, 0]));
    assert_eq!(parse_hex_color("red"), None);
    assert_eq!(parse_hex_color("12345"), None);
    assert_eq!(ReportConfig::default().highlight, DEFAULT_HIGHLIGHT);
    assert!(ReportConfig::default().compress);
}
