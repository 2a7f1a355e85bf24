use crate::cli::GrammarIoArgs;
use crate::grammar_load;
use anyhow::Result;
use xfsx::xml::dom::Document;
use xfsx::xml::pretty::{self, Options};

/// `compute-aci`: print the AuditControlInfo summary for a TransferBatch
/// without modifying the input.
pub fn compute_aci(args: &GrammarIoArgs) -> Result<()> {
    let paths = grammar_load::resolve_paths(&args.grammar.asn)?;
    let grammar = grammar_load::load(&paths)?;

    let input = super::read_whole_file(&args.input)?;
    let aci = xfsx::tap::compute_aci(&input, &grammar)?;
    let xml = aci.to_xml(2);

    super::emit(args.output.as_deref(), xml.as_bytes())
}

/// `write-aci`: recompute the AuditControlInfo trailer and splice it back
/// into the BER file in place of whatever summary record was already there.
pub fn write_aci(args: &GrammarIoArgs) -> Result<()> {
    let paths = grammar_load::resolve_paths(&args.grammar.asn)?;
    let grammar = grammar_load::load(&paths)?;

    let input = super::read_whole_file(&args.input)?;
    let opts = Options::default();
    let mut xml = String::new();
    pretty::write_pretty(&input, &grammar, &opts, &mut xml)?;
    let mut doc = Document::parse(&xml)?;

    xfsx::tap::write_aci(&mut doc, &grammar)?;

    let ber = xfsx::xml::build::write_ber(&doc, &grammar)?;
    super::emit(args.output.as_deref(), &ber)
}
