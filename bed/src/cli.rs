//! Command-line surface: one `clap` derive struct per subcommand, one
//! `clap` field per flag the command supports.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bed", author, version, about = "BER <-> XML editor for TAP/RAP billing records", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (stackable: -v, -vv, -vvv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pretty-print a BER file as indented, typed XML.
    PrettyWriteXml(PrettyArgs),
    /// Reconstruct BER from an XML file, preserving its length form.
    WriteBer(WriteBerArgs),
    /// Re-emit BER with every length field re-chosen as minimal identifier form.
    WriteId(IoArgs),
    /// Re-emit BER with every constructed value forced to definite length.
    WriteDef(IoArgs),
    /// Re-emit BER with every constructed value forced to indefinite length.
    WriteIndef(IoArgs),
    /// Locate a sub-tree by absolute or relative tag path.
    Search(SearchArgs),
    /// Apply one or more splice edit operations to a BER file.
    Edit(EditArgs),
    /// Validate a BER file's XML rendering against an XSD.
    Validate(ValidateArgs),
    /// Compute and print the AuditControlInfo summary for a TransferBatch.
    ComputeAci(GrammarIoArgs),
    /// Recompute and splice the AuditControlInfo trailer in place.
    WriteAci(GrammarIoArgs),
    /// Print a bash completion script for this program to stdout.
    MkBashComp,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GrammarArgs {
    /// One or more pre-built grammar files (repeatable). Falls back to
    /// `ASN1_PATH` autodetection when omitted.
    #[arg(long = "asn")]
    pub asn: Vec<PathBuf>,

    /// XSD schema to validate the rendered XML against.
    #[arg(long = "xsd")]
    pub xsd: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct PrettyArgs {
    #[command(flatten)]
    pub grammar: GrammarArgs,

    /// Spaces per indentation level.
    #[arg(long, default_value_t = 2)]
    pub indent: usize,
    /// Render every primitive's content as hex.
    #[arg(long)]
    pub hex: bool,
    /// Emit a `tag` attribute on every element.
    #[arg(long)]
    pub tag: bool,
    /// Emit a `klasse` attribute on every element.
    #[arg(long)]
    pub klasse: bool,
    /// Emit a `tl` attribute (identifier+length byte count) on every element.
    #[arg(long)]
    pub tl: bool,
    /// Emit a `t_size` debug attribute on every element.
    #[arg(long = "t-size")]
    pub t_size: bool,
    /// Emit a `length` attribute (raw decoded length) on every element.
    #[arg(long)]
    pub length: bool,
    /// Emit an `offset` attribute on every element.
    #[arg(long)]
    pub offset: bool,
    /// Skip to this byte offset before pretty-printing.
    #[arg(long)]
    pub skip: Option<usize>,
    /// Emit a BCD field's raw packed bytes alongside its decoded text.
    #[arg(long)]
    pub bci: bool,
    /// Stop after emitting the subtree matching this tag-path search.
    #[arg(long)]
    pub search: Option<String>,
    /// Stop after the first top-level subtree.
    #[arg(long)]
    pub first: bool,
    /// Stop after this many top-level subtrees.
    #[arg(long)]
    pub count: Option<usize>,

    pub input: PathBuf,
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct WriteBerArgs {
    #[command(flatten)]
    pub grammar: GrammarArgs,

    pub input: PathBuf,
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct IoArgs {
    #[command(flatten)]
    pub grammar: GrammarArgs,

    pub input: PathBuf,
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub grammar: GrammarArgs,

    /// Tag-path expression: a comma-separated list of tag numbers, `0`
    /// meaning wildcard, optionally prefixed with `/` for an absolute path.
    #[arg(long = "expr")]
    pub expr: String,

    pub input: PathBuf,
}

#[derive(clap::Args, Debug, Clone)]
pub struct EditArgs {
    #[command(flatten)]
    pub grammar: GrammarArgs,

    /// One edit operation (repeatable): `remove:SEL`,
    /// `replace:SEL:REGEX:TEMPLATE`, `add:SEL:NAME:TEXT` (prefix NAME with
    /// `+` to insert after the last same-named sibling),
    /// `set-att:SEL:ATTR:VALUE`, `insert:SEL:XML_OR_@FILE:POSITION`, or
    /// `write-aci`.
    #[arg(short = 'c', long = "op")]
    pub ops: Vec<String>,

    /// Output path (defaults to stdout).
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    pub input: PathBuf,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub grammar: GrammarArgs,

    pub input: PathBuf,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GrammarIoArgs {
    #[command(flatten)]
    pub grammar: GrammarArgs,

    pub input: PathBuf,
    pub output: Option<PathBuf>,
}
