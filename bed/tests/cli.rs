//! Black-box CLI coverage: drives the compiled `bed` binary the way a
//! shell script would, via `assert_cmd`.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn sample_ber() -> Vec<u8> {
    // Context [1] primitive, value 0x2a, wrapped in an Application [1]
    // constructed TransferBatch.
    let inner = [0x81, 0x01, 0x2a];
    let mut out = vec![0x61, inner.len() as u8];
    out.extend_from_slice(&inner);
    out
}

fn sample_grammar_file() -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "TransferBatch APPLICATION 1 constructed").unwrap();
    writeln!(f, "BatchControlInfo CONTEXT 1 primitive integer_unsigned").unwrap();
    f
}

#[test]
fn pretty_write_xml_renders_known_tags() {
    let grammar = sample_grammar_file();
    let mut input = tempfile::NamedTempFile::new().unwrap();
    input.write_all(&sample_ber()).unwrap();

    Command::cargo_bin("bed")
        .unwrap()
        .arg("pretty-write-xml")
        .arg("--asn")
        .arg(grammar.path())
        .arg(input.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("TransferBatch"));
}

#[test]
fn search_reports_no_match_as_failure() {
    let grammar = sample_grammar_file();
    let mut input = tempfile::NamedTempFile::new().unwrap();
    input.write_all(&sample_ber()).unwrap();

    Command::cargo_bin("bed")
        .unwrap()
        .arg("search")
        .arg("--asn")
        .arg(grammar.path())
        .arg("--expr")
        .arg("99")
        .arg(input.path())
        .assert()
        .failure();
}

#[test]
fn mk_bash_comp_prints_a_completion_script() {
    Command::cargo_bin("bed")
        .unwrap()
        .arg("mk-bash-comp")
        .assert()
        .success()
        .stdout(predicate::str::contains("complete"));
}

#[test]
fn write_id_round_trips_a_minimal_file() {
    let mut input = tempfile::NamedTempFile::new().unwrap();
    input.write_all(&sample_ber()).unwrap();

    Command::cargo_bin("bed")
        .unwrap()
        .arg("write-id")
        .arg(input.path())
        .assert()
        .success();
}
