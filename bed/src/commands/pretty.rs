use crate::cli::PrettyArgs;
use crate::grammar_load;
use anyhow::Result;
use xfsx::scratchpad::{MappedReader, Reader};
use xfsx::xml::pretty::{self, Options};

pub fn pretty_write_xml(args: &PrettyArgs) -> Result<()> {
    let paths = grammar_load::resolve_paths(&args.grammar.asn)?;
    let grammar = grammar_load::load(&paths)?;

    let reader = MappedReader::open(&args.input)?;
    let input = reader.slice();

    let opts = Options {
        indent: args.indent,
        hex: args.hex,
        show_tag: args.tag,
        show_klasse: args.klasse,
        show_tl: args.tl,
        dump_tl: args.t_size,
        show_length: args.length,
        offset: args.offset,
        bci: args.bci,
        skip_first_n_bytes: args.skip.unwrap_or(0),
        count: args.count,
        first_only: args.first,
    };

    let start_offset = match &args.search {
        Some(expr) => {
            let (path, relative) = super::search::parse_tag_path(expr)?;
            xfsx::search::search(input, &path, relative)?.unwrap_or(input.len())
        }
        None => opts.skip_first_n_bytes,
    };
    let mut opts = opts;
    opts.skip_first_n_bytes = start_offset;

    let mut xml = String::new();
    pretty::write_pretty(input, &grammar, &opts, &mut xml)?;

    super::emit(args.output.as_deref(), xml.as_bytes())
}
