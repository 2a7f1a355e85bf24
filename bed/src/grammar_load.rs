//! Grammar loading: turns one or more `--asn` grammar files (or the
//! `ASN1_PATH`-autodetected equivalents) into an [`xfsx::grammar::Grammar`].
//!
//! Compiling actual ASN.1 module source is out of scope for `xfsx`,
//! which only ever consumes a pre-built grammar object. `bed` is the
//! collaborator responsible for that compile step, but since a real
//! ASN.1 front end isn't part of this workspace either, the files
//! `--asn` names here are read in the already-compiled line format a
//! real front end would emit: one declaration per line,
//!
//! ```text
//! <Name> <CLASS> <tag> <primitive|constructed> [<content-kind>]
//! ```
//!
//! e.g. `TransferBatch APPLICATION 1 constructed` or
//! `ChargeAmount CONTEXT 5 primitive bcd_string`. Blank lines and lines
//! starting with `#` are ignored.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use xfsx::grammar::{ContentKind, ContentTyper, Grammar, NameTranslator, Shape, TagTranslator};
use xfsx::tag::TagClass;

/// Environment variable holding a colon-separated search path for grammar
/// files, consulted when no `--asn` flag is given.
pub const ASN1_PATH_VAR: &str = "ASN1_PATH";

/// Resolve the grammar files to load: the explicit `--asn` paths if any
/// were given, otherwise every regular file found on each `ASN1_PATH`
/// directory entry.
pub fn resolve_paths(explicit: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if !explicit.is_empty() {
        return Ok(explicit.to_vec());
    }
    let path_var = env::var(ASN1_PATH_VAR)
        .with_context(|| format!("no --asn given and {ASN1_PATH_VAR} is not set"))?;
    let mut found = Vec::new();
    for dir in env::split_paths(&path_var) {
        if !dir.is_dir() {
            continue;
        }
        for entry in std::fs::read_dir(&dir)
            .with_context(|| format!("reading {ASN1_PATH_VAR} directory {}", dir.display()))?
        {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                found.push(entry.path());
            }
        }
    }
    if found.is_empty() {
        bail!("no grammar files found on {ASN1_PATH_VAR}={path_var}");
    }
    Ok(found)
}

/// Load and merge every grammar file named in `paths` into one [`Grammar`].
pub fn load(paths: &[PathBuf]) -> Result<Grammar> {
    let mut names = NameTranslator::new();
    let mut by_tag: HashMap<(TagClass, u32), String> = HashMap::new();
    let mut typer = ContentTyper::new();

    for path in paths {
        load_one(path, &mut names, &mut by_tag, &mut typer)
            .with_context(|| format!("loading grammar file {}", path.display()))?;
    }

    Ok(Grammar::new(
        names,
        TagTranslator::new(by_tag),
        typer.with_default(ContentKind::Raw),
    ))
}

fn load_one(
    path: &Path,
    names: &mut NameTranslator,
    by_tag: &mut HashMap<(TagClass, u32), String>,
    typer: &mut ContentTyper,
) -> Result<()> {
    let text = std::fs::read_to_string(path)?;
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            bail!("{}:{}: expected at least 4 fields, got {}", path.display(), lineno + 1, fields.len());
        }
        let name = fields[0];
        let class = parse_class(fields[1])
            .with_context(|| format!("{}:{}: unknown class {:?}", path.display(), lineno + 1, fields[1]))?;
        let tag: u32 = fields[2]
            .parse()
            .with_context(|| format!("{}:{}: bad tag number {:?}", path.display(), lineno + 1, fields[2]))?;
        let shape = parse_shape(fields[3])
            .with_context(|| format!("{}:{}: unknown shape {:?}", path.display(), lineno + 1, fields[3]))?;

        names.insert(name, shape, class, tag);
        by_tag.insert((class, tag), name.to_string());
        if let Some(&kind_field) = fields.get(4) {
            let kind = parse_content_kind(kind_field)
                .with_context(|| format!("{}:{}: unknown content kind {:?}", path.display(), lineno + 1, kind_field))?;
            typer.insert(class, tag, kind);
        }
    }
    Ok(())
}

fn parse_class(s: &str) -> Result<TagClass> {
    Ok(match s.to_ascii_lowercase().as_str() {
        "universal" => TagClass::Universal,
        "application" => TagClass::Application,
        "context" => TagClass::Context,
        "private" => TagClass::Private,
        other => bail!("unknown tag class {other:?}"),
    })
}

fn parse_shape(s: &str) -> Result<Shape> {
    Ok(match s.to_ascii_lowercase().as_str() {
        "primitive" => Shape::Primitive,
        "constructed" => Shape::Constructed,
        other => bail!("unknown shape {other:?}"),
    })
}

fn parse_content_kind(s: &str) -> Result<ContentKind> {
    Ok(match s.to_ascii_lowercase().as_str() {
        "integer_signed" => ContentKind::IntegerSigned,
        "integer_unsigned" => ContentKind::IntegerUnsigned,
        "octet_string" => ContentKind::OctetString,
        "bcd_string" => ContentKind::BcdString,
        "ia5_string" => ContentKind::Ia5String,
        "bit_string" => ContentKind::BitString,
        "timestamp" => ContentKind::Timestamp,
        "raw" => ContentKind::Raw,
        other => bail!("unknown content kind {other:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_names_tags_and_content_kinds() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "# a comment").unwrap();
        writeln!(f, "TransferBatch APPLICATION 1 constructed").unwrap();
        writeln!(f, "ChargeAmount CONTEXT 5 primitive bcd_string").unwrap();
        let grammar = load(&[f.path().to_path_buf()]).unwrap();

        let (shape, class, tag) = grammar.name_translator.translate("TransferBatch").unwrap();
        assert!(matches!(shape, Shape::Constructed));
        assert_eq!(class, TagClass::Application);
        assert_eq!(tag, 1);

        assert_eq!(
            grammar.tag_translator.lookup(TagClass::Context, 5),
            Some("ChargeAmount")
        );
        assert_eq!(
            grammar.content_typer.classify(TagClass::Context, 5),
            ContentKind::BcdString
        );
    }

    #[test]
    fn resolve_paths_prefers_explicit_over_env() {
        let explicit = vec![PathBuf::from("a.asn"), PathBuf::from("b.asn")];
        assert_eq!(resolve_paths(&explicit).unwrap(), explicit);
    }
}
