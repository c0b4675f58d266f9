//! Integration tests for the conversion facade over the in-process provider

use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::thread;

use printschema::devmode::{consts, DevModeFields};
use printschema::provider::{BaseDevModeType, ConflictStatus, PrintTicketScope};
use printschema::schema::enums::{
    Duplexing, OutputColor, PageMediaSizeName, PageOrientation,
};
use printschema::{DevMode, Error, InProcessProvider, PrintTicket, PrintTicketConverter};

fn fixture(name: &str) -> Vec<u8> {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    std::fs::read(path).unwrap()
}

fn converter() -> PrintTicketConverter<InProcessProvider> {
    let provider =
        InProcessProvider::new("Contoso LaserJet", fixture("capabilities.xml")).unwrap();
    PrintTicketConverter::new("Contoso LaserJet", 1, provider).unwrap()
}

#[test]
fn test_merge_without_delta_is_conflict_free() {
    let mut converter = converter();
    let (merged, status) = converter
        .merge_and_validate(&fixture("ticket.xml"), None, None)
        .unwrap();
    assert_eq!(status, ConflictStatus::NoConflict);

    let merged = PrintTicket::parse(&merged).unwrap();
    assert_eq!(merged.duplex().value(), Some(Duplexing::TwoSidedLongEdge));
    assert_eq!(merged.copies().value(), 3);
}

#[test]
fn test_merge_resolves_unsupported_delta_option() {
    let mut converter = converter();
    let (merged, status) = converter
        .merge_and_validate(&fixture("ticket.xml"), Some(&fixture("delta.xml")), None)
        .unwrap();
    assert_eq!(status, ConflictStatus::ConflictResolved);

    let merged = PrintTicket::parse(&merged).unwrap();
    // ReverseLandscape is not offered, the first supported option wins
    assert_eq!(merged.orientation().value(), Some(PageOrientation::Portrait));
    assert_eq!(merged.output_color().value(), Some(OutputColor::Monochrome));
    assert_eq!(merged.duplex().value(), Some(Duplexing::TwoSidedLongEdge));
    assert_eq!(merged.media_size().value(), Some(PageMediaSizeName::IsoA4));
}

#[test]
fn test_merge_clamps_parameters() {
    let base = PrintTicket::parse(&fixture("ticket.xml")).unwrap();
    base.copies().set_value(5000).unwrap();

    let mut converter = converter();
    let (merged, status) = converter
        .merge_and_validate(&base.to_bytes().unwrap(), None, None)
        .unwrap();
    assert_eq!(status, ConflictStatus::ConflictResolved);
    assert_eq!(PrintTicket::parse(&merged).unwrap().copies().value(), 999);
}

#[test]
fn test_merge_in_page_scope() {
    let mut converter = converter();
    let (merged, _) = converter
        .merge_and_validate(&fixture("ticket.xml"), None, Some(PrintTicketScope::Page))
        .unwrap();
    let merged = PrintTicket::parse(&merged).unwrap();
    assert_eq!(merged.duplex().value(), None);
    assert_eq!(
        merged.feature_keywords(),
        vec!["PageOrientation", "PageMediaSize", "PageResolution"]
    );
}

#[test]
fn test_devmode_round_trip() {
    let mut converter = converter();
    let devmode = converter
        .convert_ticket_to_devmode(&fixture("ticket.xml"), BaseDevModeType::UserDefault, None)
        .unwrap();

    let decoded = DevMode::decode(&devmode).unwrap();
    assert_eq!(decoded.device_name, "Contoso LaserJet");
    assert!(decoded.has(DevModeFields::ORIENTATION | DevModeFields::DUPLEX));
    assert_eq!(decoded.orientation, consts::ORIENT_PORTRAIT);
    assert_eq!(decoded.paper_size, 9);
    assert_eq!(decoded.duplex, consts::DUPLEX_VERTICAL);
    assert_eq!(decoded.copies, 3);
    assert_eq!(decoded.print_quality, 600);

    let ticket = converter.convert_devmode_to_ticket(&devmode, None).unwrap();
    let ticket = PrintTicket::parse(&ticket).unwrap();
    assert_eq!(ticket.orientation().value(), Some(PageOrientation::Portrait));
    assert_eq!(ticket.media_size().value(), Some(PageMediaSizeName::IsoA4));
    assert_eq!(ticket.duplex().value(), Some(Duplexing::TwoSidedLongEdge));
    assert_eq!(ticket.copies().value(), 3);
    assert_eq!(ticket.resolution().x(), 600);
}

#[test]
fn test_oversized_custom_media_saturates() {
    let mut converter = converter();
    let ticket = PrintTicket::new();
    ticket.media_size().set_custom(i32::MAX, 297_000).unwrap();

    let devmode = converter
        .convert_ticket_to_devmode(&ticket.to_bytes().unwrap(), BaseDevModeType::UserDefault, None)
        .unwrap();

    let decoded = DevMode::decode(&devmode).unwrap();
    assert_eq!(decoded.paper_size, consts::PAPER_USER);
    assert_eq!(decoded.paper_width, i16::MAX);
    assert_eq!(decoded.paper_length, 2970);
}

#[test]
fn test_capabilities_pass_through() {
    let mut converter = converter();
    assert_eq!(
        converter.get_print_capabilities(None).unwrap(),
        fixture("capabilities.xml")
    );
    assert!(matches!(
        converter.get_print_capabilities(Some(b"not xml")),
        Err(Error::Provider(_))
    ));
}

#[test]
fn test_calls_after_release_fail() {
    let mut converter = converter();
    converter.release().unwrap();
    assert!(matches!(
        converter.merge_and_validate(&fixture("ticket.xml"), None, None),
        Err(Error::Disposed(_))
    ));
    assert!(matches!(
        converter.convert_devmode_to_ticket(&[], None),
        Err(Error::Disposed(_))
    ));
}

#[test]
fn test_calls_from_another_thread_fail() {
    let mut converter = converter();
    let result = thread::scope(|s| {
        s.spawn(|| converter.get_print_capabilities(None))
            .join()
            .unwrap()
    });
    assert!(matches!(result, Err(Error::InvalidThreadAccess)));
    assert!(converter.get_print_capabilities(None).is_ok());
}

#[test]
fn test_constructor_arguments() {
    let provider = || InProcessProvider::new("p", fixture("capabilities.xml")).unwrap();
    assert_eq!(PrintTicketConverter::<InProcessProvider>::max_print_schema_version(), 1);
    assert!(matches!(
        PrintTicketConverter::new("", 1, provider()),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        PrintTicketConverter::new("p", 2, provider()),
        Err(Error::ArgumentOutOfRange { .. })
    ));
    assert!(matches!(
        InProcessProvider::new("p", fixture("ticket.xml")),
        Err(Error::Format(_))
    ));
}
