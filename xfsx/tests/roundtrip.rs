//! End-to-end coverage across module boundaries: build a small BER
//! sample by hand, pretty-print it, parse the XML back, and rebuild BER
//! from it.

use std::collections::HashMap;
use xfsx::grammar::{ContentKind, ContentTyper, Grammar, NameTranslator, Shape, TagTranslator};
use xfsx::header::write_tl;
use xfsx::tag::TagClass;
use xfsx::xml::build;
use xfsx::xml::dom::Document;
use xfsx::xml::pretty::{self, Options};

fn sample_grammar() -> Grammar {
    let mut names = NameTranslator::new();
    names.insert("TransferBatch", Shape::Constructed, TagClass::Application, 1);
    names.insert("AccountingInfo", Shape::Constructed, TagClass::Context, 0);
    names.insert("TapDecimalPlaces", Shape::Primitive, TagClass::Context, 1);

    let mut typer = ContentTyper::new();
    typer.insert(TagClass::Context, 1, ContentKind::IntegerUnsigned);

    Grammar::new(
        names,
        TagTranslator::new(HashMap::new()),
        typer.with_default(ContentKind::Raw),
    )
}

fn sample_ber() -> Vec<u8> {
    let mut decimal_places = write_tl(TagClass::Context, 1, false, 1, 0).unwrap();
    decimal_places.push(0x02); // u8 "2"

    let mut accounting = write_tl(TagClass::Context, 0, true, decimal_places.len() as u32, 0).unwrap();
    accounting.extend(decimal_places);

    let mut batch = write_tl(TagClass::Application, 1, true, accounting.len() as u32, 0).unwrap();
    batch.extend(accounting);
    batch
}

#[test]
fn pretty_print_then_rebuild_is_byte_exact() {
    let original = sample_ber();
    let grammar = sample_grammar();

    let mut xml = String::new();
    pretty::write_pretty(&original, &grammar, &Options::default(), &mut xml).unwrap();
    assert!(xml.contains("TransferBatch"));
    assert!(xml.contains("AccountingInfo"));

    let doc = Document::parse(&xml).unwrap();
    let rebuilt = build::write_ber(&doc, &grammar).unwrap();

    assert_eq!(rebuilt, original);
}

#[test]
fn pretty_print_then_rebuild_is_byte_exact_for_non_minimal_length() {
    let grammar = sample_grammar();

    // `TapDecimalPlaces`, value 1 byte, but its length field is forced to
    // a non-minimal 3 content bytes (`0x83 00 00 01`, 4 bytes total).
    let mut decimal_places = write_tl(TagClass::Context, 1, false, 1, 3).unwrap();
    decimal_places.push(0x02);
    let mut accounting = write_tl(TagClass::Context, 0, true, decimal_places.len() as u32, 0).unwrap();
    accounting.extend(decimal_places);
    let mut original = write_tl(TagClass::Application, 1, true, accounting.len() as u32, 0).unwrap();
    original.extend(accounting);

    let mut xml = String::new();
    pretty::write_pretty(&original, &grammar, &Options::default(), &mut xml).unwrap();
    assert!(xml.contains("l_size=\"3\""));

    let doc = Document::parse(&xml).unwrap();
    let rebuilt = build::write_ber(&doc, &grammar).unwrap();

    assert_eq!(rebuilt, original);
}

#[test]
fn search_finds_the_nested_field_by_relative_tag_path() {
    let original = sample_ber();
    let offset = xfsx::search::search(&original, &[0, 1], true).unwrap();
    assert!(offset.is_some());
    assert!(offset.unwrap() > 0);
}

#[test]
fn convert_to_indefinite_then_back_preserves_bytes() {
    let original = sample_ber();
    let indefinite = xfsx::convert::to_indefinite(&original).unwrap();
    assert_ne!(indefinite, original);
    let back = xfsx::convert::to_definite(&indefinite).unwrap();
    assert_eq!(back, original);
}
