use crate::cli::ValidateArgs;
use crate::grammar_load;
use anyhow::{bail, Context, Result};
use std::io::Write;
use std::process::Command;
use xfsx::xml::pretty::{self, Options};

/// `validate`: render a BER file as XML and hand it to an external XML
/// schema validator (`xmllint`) against `--xsd`. The core never parses
/// XSD itself; this command is a thin wrapper around that collaborator.
pub fn validate(args: &ValidateArgs) -> Result<()> {
    let xsd = match &args.grammar.xsd {
        Some(path) => path,
        None => bail!("validate requires --xsd PATH"),
    };

    let paths = grammar_load::resolve_paths(&args.grammar.asn)?;
    let grammar = grammar_load::load(&paths)?;

    let input = super::read_whole_file(&args.input)?;
    let opts = Options::default();
    let mut xml = String::new();
    pretty::write_pretty(&input, &grammar, &opts, &mut xml)?;

    let mut rendered = tempfile::Builder::new()
        .suffix(".xml")
        .tempfile()
        .context("creating temporary file for rendered XML")?;
    rendered
        .write_all(xml.as_bytes())
        .context("writing rendered XML to temporary file")?;

    let status = Command::new("xmllint")
        .arg("--noout")
        .arg("--schema")
        .arg(xsd)
        .arg(rendered.path())
        .status()
        .context("invoking xmllint; is it installed and on PATH?")?;

    if status.success() {
        println!("validates");
        Ok(())
    } else {
        bail!("{} does not validate against {}", args.input.display(), xsd.display());
    }
}
