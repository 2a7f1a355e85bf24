use crate::cli::{IoArgs, WriteBerArgs};
use crate::grammar_load;
use anyhow::Result;
use xfsx::xml::dom::Document;

/// `write-ber`: build BER from an XML file.
pub fn write_ber(args: &WriteBerArgs) -> Result<()> {
    let paths = grammar_load::resolve_paths(&args.grammar.asn)?;
    let grammar = grammar_load::load(&paths)?;

    let xml = std::fs::read_to_string(&args.input)?;
    let doc = Document::parse(&xml)?;
    let ber = xfsx::xml::build::write_ber(&doc, &grammar)?;

    super::emit(args.output.as_deref(), &ber)
}

/// `write-id`: re-emit a BER file with every TL header re-chosen as
/// minimal, leaving each value's definite/indefinite choice untouched.
pub fn write_id(args: &IoArgs) -> Result<()> {
    let input = super::read_whole_file(&args.input)?;
    let out = xfsx::convert::to_minimal(&input)?;
    super::emit(args.output.as_deref(), &out)
}

/// `write-def`: force every constructed value to definite length.
pub fn write_def(args: &IoArgs) -> Result<()> {
    let input = super::read_whole_file(&args.input)?;
    let out = xfsx::convert::to_definite(&input)?;
    super::emit(args.output.as_deref(), &out)
}

/// `write-indef`: force every constructed value to indefinite length.
pub fn write_indef(args: &IoArgs) -> Result<()> {
    let input = super::read_whole_file(&args.input)?;
    let out = xfsx::convert::to_indefinite(&input)?;
    super::emit(args.output.as_deref(), &out)
}
