use crate::cli::EditArgs;
use crate::grammar_load;
use anyhow::{bail, Context, Result};
use regex::Regex;
use xfsx::edit::{self, Op};
use xfsx::xml::dom::Document;
use xfsx::xml::pretty::{self, Options};

/// A parsed `-c`/`--op` argument, owning whatever its `xfsx::edit::Op`
/// borrows so all of them can be built before any is applied.
enum OwnedOp {
    Remove { selector: String },
    Replace {
        selector: String,
        pattern: Regex,
        template: String,
    },
    Add {
        parent_selector: String,
        child_name: String,
        after_last_sibling: bool,
        text: String,
    },
    SetAttribute {
        selector: String,
        name: String,
        value: String,
    },
    Insert {
        parent_selector: String,
        xml: String,
        position: i32,
    },
    WriteAci,
}

impl OwnedOp {
    fn as_op(&self) -> Op<'_> {
        match self {
            OwnedOp::Remove { selector } => Op::Remove { selector },
            OwnedOp::Replace {
                selector,
                pattern,
                template,
            } => Op::Replace {
                selector,
                pattern,
                template,
            },
            OwnedOp::Add {
                parent_selector,
                child_name,
                after_last_sibling,
                text,
            } => Op::Add {
                parent_selector,
                child_name,
                after_last_sibling: *after_last_sibling,
                text,
            },
            OwnedOp::SetAttribute {
                selector,
                name,
                value,
            } => Op::SetAttribute {
                selector,
                name,
                value,
            },
            OwnedOp::Insert {
                parent_selector,
                xml,
                position,
            } => Op::Insert {
                parent_selector,
                xml,
                position: *position,
            },
            OwnedOp::WriteAci => Op::WriteAci,
        }
    }
}

fn split_n(spec: &str, n: usize) -> Result<Vec<&str>> {
    let parts: Vec<&str> = spec.splitn(n, ':').collect();
    if parts.len() != n {
        bail!("expected {n} ':'-separated fields in {spec:?}");
    }
    Ok(parts)
}

fn parse_op(spec: &str) -> Result<OwnedOp> {
    let (kind, rest) = spec.split_once(':').unwrap_or((spec, ""));
    Ok(match kind {
        "write-aci" => OwnedOp::WriteAci,
        "remove" => OwnedOp::Remove {
            selector: rest.to_string(),
        },
        "replace" => {
            let p = split_n(rest, 3)?;
            OwnedOp::Replace {
                selector: p[0].to_string(),
                pattern: Regex::new(p[1]).with_context(|| format!("bad regex in {spec:?}"))?,
                template: p[2].to_string(),
            }
        }
        "add" => {
            let p = split_n(rest, 3)?;
            let (child_name, after_last_sibling) = match p[1].strip_prefix('+') {
                Some(n) => (n.to_string(), true),
                None => (p[1].to_string(), false),
            };
            OwnedOp::Add {
                parent_selector: p[0].to_string(),
                child_name,
                after_last_sibling,
                text: p[2].to_string(),
            }
        }
        "set-att" => {
            let p = split_n(rest, 3)?;
            OwnedOp::SetAttribute {
                selector: p[0].to_string(),
                name: p[1].to_string(),
                value: p[2].to_string(),
            }
        }
        "insert" => {
            let p = split_n(rest, 3)?;
            let xml = match p[1].strip_prefix('@') {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("reading insert fragment {path:?}"))?,
                None => p[1].to_string(),
            };
            let position = p[2]
                .parse::<i32>()
                .with_context(|| format!("bad insert position in {spec:?}"))?;
            OwnedOp::Insert {
                parent_selector: p[0].to_string(),
                xml,
                position,
            }
        }
        other => bail!("unknown edit op {other:?}"),
    })
}

/// `edit`: apply one or more splice operations to a BER file, re-emitting
/// BER with the original length-form choices preserved.
pub fn edit(args: &EditArgs) -> Result<()> {
    let paths = grammar_load::resolve_paths(&args.grammar.asn)?;
    let grammar = grammar_load::load(&paths)?;

    let input = super::read_whole_file(&args.input)?;
    let opts = Options::default();
    let mut xml = String::new();
    pretty::write_pretty(&input, &grammar, &opts, &mut xml)?;
    let mut doc = Document::parse(&xml)?;

    let ops = args
        .ops
        .iter()
        .map(|s| parse_op(s))
        .collect::<Result<Vec<_>>>()?;
    for op in &ops {
        edit::apply(&mut doc, &op.as_op(), &grammar)?;
    }

    let ber = xfsx::xml::build::write_ber(&doc, &grammar)?;
    super::emit(args.output.as_deref(), &ber)
}
