//! Integration tests for editing print tickets

use pretty_assertions::assert_eq;
use std::path::PathBuf;

use printschema::schema::enums::{
    Collation, Duplexing, PageMediaSizeName, PageOrientation, PageScaling,
};
use printschema::schema::{SchemaEnum, UNSPECIFIED_INT};
use printschema::ticket::TicketFeature;
use printschema::{Error, PrintTicket};

fn fixture(name: &str) -> Vec<u8> {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    std::fs::read(path).unwrap()
}

fn ticket() -> PrintTicket {
    PrintTicket::parse(&fixture("ticket.xml")).unwrap()
}

#[test]
fn test_read_fixture_settings() {
    let t = ticket();
    assert_eq!(t.duplex().value(), Some(Duplexing::TwoSidedLongEdge));
    assert_eq!(t.orientation().value(), Some(PageOrientation::Portrait));
    assert_eq!(t.media_size().value(), Some(PageMediaSizeName::IsoA4));
    assert_eq!(t.media_size().width(), 210_000);
    assert_eq!(t.media_size().height(), 297_000);
    assert_eq!(t.resolution().x(), 600);
    assert_eq!(t.resolution().y(), 600);
    assert_eq!(t.copies().value(), 3);

    assert_eq!(t.collate().value(), None);
    assert_eq!(t.collate().code(), 0);
    assert_eq!(t.nup().pages_per_sheet(), UNSPECIFIED_INT);
}

#[test]
fn test_feature_keywords_in_document_order() {
    assert_eq!(
        ticket().feature_keywords(),
        vec![
            "JobDuplexAllDocumentsContiguously",
            "PageOrientation",
            "PageMediaSize",
            "PageResolution",
        ]
    );
}

#[test]
fn test_edit_and_save() {
    let t = ticket();
    t.duplex().set_value(Duplexing::OneSided).unwrap();
    t.collate().set_value(Collation::Collated).unwrap();
    t.copies().set_value(12).unwrap();
    t.scaling().set_custom_square(150).unwrap();

    let saved = t.to_bytes().unwrap();
    let reparsed = PrintTicket::parse(&saved).unwrap();
    assert_eq!(reparsed.duplex().value(), Some(Duplexing::OneSided));
    assert_eq!(reparsed.collate().value(), Some(Collation::Collated));
    assert_eq!(reparsed.copies().value(), 12);
    assert_eq!(reparsed.scaling().value(), Some(PageScaling::CustomSquare));
    assert_eq!(reparsed.scaling().scale(), 150);
    // untouched settings survive
    assert_eq!(reparsed.orientation().value(), Some(PageOrientation::Portrait));
    assert_eq!(reparsed.resolution().x(), 600);
}

#[test]
fn test_switch_to_custom_media_size() {
    let t = ticket();
    t.media_size().set_custom(100_000, 150_000).unwrap();
    assert_eq!(
        t.media_size().value(),
        Some(PageMediaSizeName::CustomMediaSize)
    );
    assert_eq!(t.media_size().width(), 100_000);
    assert_eq!(t.media_size().height(), 150_000);

    t.media_size().set_fixed(PageMediaSizeName::NorthAmericaLetter).unwrap();
    assert_eq!(
        t.media_size().value(),
        Some(PageMediaSizeName::NorthAmericaLetter)
    );
    assert_eq!(t.media_size().width(), UNSPECIFIED_INT);

    let xml = t.to_xml_string().unwrap();
    assert!(!xml.contains("PageMediaSizeMediaSizeWidth"), "{}", xml);
}

#[test]
fn test_invalid_values_are_rejected() {
    let t = ticket();
    assert!(matches!(
        t.copies().set_value(0),
        Err(Error::ArgumentOutOfRange { .. })
    ));
    assert!(matches!(
        t.media_size().set_fixed(PageMediaSizeName::CustomMediaSize),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        t.media_size().set_custom(-1, 100),
        Err(Error::ArgumentOutOfRange { .. })
    ));
    assert_eq!(t.copies().value(), 3);
    assert_eq!(t.media_size().value(), Some(PageMediaSizeName::IsoA4));
}

#[test]
fn test_clear_settings() {
    let t = ticket();
    t.duplex().clear();
    t.copies().clear();
    t.setting(TicketFeature::PageResolution).clear();

    assert_eq!(t.duplex().value(), None);
    assert_eq!(t.copies().value(), UNSPECIFIED_INT);
    assert_eq!(t.resolution().x(), UNSPECIFIED_INT);
    assert_eq!(
        t.feature_keywords(),
        vec!["PageOrientation", "PageMediaSize"]
    );
}

#[test]
fn test_missing_standard_prefixes_are_injected() {
    let xml = r#"<PrintTicket version="1"
        xmlns="http://schemas.microsoft.com/windows/2003/08/printing/printschemaframework"/>"#;
    let t = PrintTicket::parse(xml.as_bytes()).unwrap();
    t.orientation().set_value(PageOrientation::Landscape).unwrap();

    let saved = t.to_xml_string().unwrap();
    let reparsed = PrintTicket::parse(saved.as_bytes()).unwrap();
    assert_eq!(
        reparsed.orientation().value(),
        Some(PageOrientation::Landscape)
    );
    assert_eq!(reparsed.orientation().code(), PageOrientation::Landscape.code());
}

#[test]
fn test_not_a_ticket() {
    assert!(matches!(
        PrintTicket::parse(&fixture("capabilities.xml")),
        Err(Error::Format(_))
    ));
    assert!(matches!(
        PrintTicket::parse(b"<a><b></a>"),
        Err(Error::MalformedXml(_))
    ));
}

#[test]
fn test_clone_is_independent() {
    let t = ticket();
    let copy = t.clone_ticket().unwrap();
    copy.copies().set_value(7).unwrap();
    assert_eq!(t.copies().value(), 3);
    assert_eq!(copy.copies().value(), 7);
}
