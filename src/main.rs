use clap::{ArgAction, Parser, Subcommand};
use env_logger::Env;
use html::{
    FsOpener, Node, RenderConfig, TokenizerConfig, Tokenizer, TreeBuilder, TreeBuilderConfig,
    find_tags, flatten_text, outline, render, render_with,
};
use mimalloc::MiMalloc;
use std::convert::identity;
use std::fmt;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Debug, Parser)]
#[command(
    name = "tagtree",
    version,
    about = "Parse tolerant HTML into token trees and write it back out"
)]
struct Cli {
    /// Silence all log output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Verbose logging mode (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Decode entity references into text while tokenizing
    #[arg(long, global = true)]
    decode_entities: bool,

    /// Close tag that terminates every open element (repeatable)
    #[arg(long = "close-on", value_name = "TAG", global = true)]
    close_on: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Re-render the markup in canonical form
    Render {
        /// Put nested elements on their own lines
        #[arg(long)]
        indent: bool,
        /// Emit XHTML-style names and empty tags
        #[arg(long)]
        xhtml: bool,
        /// Turn backspace overstrikes into bold and italic markup
        #[arg(long)]
        overstrike: bool,
        /// Directory INCLUDE resources resolve against [default: the input's directory]
        #[arg(long, value_name = "DIR")]
        include_root: Option<PathBuf>,
        /// Input file, `-` for stdin
        file: Option<PathBuf>,
    },
    /// Print the plain text of the document
    Text {
        /// Input file, `-` for stdin
        file: Option<PathBuf>,
    },
    /// Print every element with one of the given tags, one per line
    Find {
        #[arg(required = true, value_name = "TAG")]
        tags: Vec<String>,
        /// Input file, `-` for stdin
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
    },
    /// Print the token tree
    Tree {
        /// Serialize the tree as JSON instead of an outline
        #[arg(long)]
        json: bool,
        /// Maximum number of outline lines
        #[arg(long, default_value_t = 10_000)]
        cap: usize,
        /// Input file, `-` for stdin
        file: Option<PathBuf>,
    },
}

#[derive(Debug)]
enum CliError {
    Read { path: String, source: io::Error },
    Write(io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Read { path, source } => write!(f, "failed to read {path}: {source}"),
            CliError::Write(err) => write!(f, "failed to write output: {err}"),
            CliError::Json(err) => write!(f, "failed to serialize tree: {err}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Read { source, .. } => Some(source),
            CliError::Write(err) => Some(err),
            CliError::Json(err) => Some(err),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Write(err)
    }
}

fn is_stdin(path: Option<&Path>) -> bool {
    path.is_none_or(|p| p == Path::new("-"))
}

fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    let mut bytes = Vec::new();
    let (label, result) = match path {
        Some(p) if !is_stdin(Some(p)) => (
            p.display().to_string(),
            std::fs::File::open(p).and_then(|mut f| f.read_to_end(&mut bytes)),
        ),
        _ => ("<stdin>".to_string(), io::stdin().lock().read_to_end(&mut bytes)),
    };
    result.map_err(|source| CliError::Read {
        path: label,
        source,
    })?;
    // Markup in the wild is not always valid UTF-8; keep going on bad bytes.
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            log::warn!(target: "tagtree", "input is not valid UTF-8; replacing bad bytes");
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    })
}

fn parse_document(cli: &Cli, source: &str) -> Vec<Node> {
    let tokenizer = Tokenizer::with_config(
        source,
        TokenizerConfig {
            decode_entities: cli.decode_entities,
        },
    );
    let config = TreeBuilderConfig {
        close_set: cli.close_on.clone(),
    };
    let nodes = TreeBuilder::with_config(tokenizer, config).build_all(identity);
    log::info!(target: "tagtree", "parsed {} top-level tokens", nodes.len());
    nodes
}

/// Directory INCLUDE names resolve against: `--include-root` if given,
/// else the input file's directory, else the current directory.
fn include_root_for(explicit: Option<&Path>, file: Option<&Path>) -> PathBuf {
    match (explicit, file) {
        (Some(dir), _) => dir.to_path_buf(),
        (None, Some(path)) if !is_stdin(Some(path)) => path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
        _ => PathBuf::from("."),
    }
}

fn finish_line<W: Write + ?Sized>(out: &mut W, written: &[u8]) -> io::Result<()> {
    if written.last().is_some_and(|&b| b != b'\n') {
        out.write_all(b"\n")?;
    }
    Ok(())
}

fn run(cli: &Cli, out: &mut dyn Write) -> Result<(), CliError> {
    match &cli.command {
        Command::Render {
            indent,
            xhtml,
            overstrike,
            include_root,
            file,
        } => {
            let source = read_input(file.as_deref())?;
            let nodes = parse_document(cli, &source);
            let root = include_root_for(include_root.as_deref(), file.as_deref());
            log::debug!(target: "tagtree", "include root {}", root.display());
            let config = RenderConfig {
                indent: *indent,
                xhtml: *xhtml,
                overstrike: *overstrike,
            };
            let mut buf = Vec::new();
            render_with(&config, &FsOpener::with_root(root), &mut buf, &nodes)?;
            out.write_all(&buf)?;
            finish_line(out, &buf)?;
        }
        Command::Text { file } => {
            let source = read_input(file.as_deref())?;
            let text = flatten_text(&parse_document(cli, &source));
            out.write_all(text.as_bytes())?;
            finish_line(out, text.as_bytes())?;
        }
        Command::Find { tags, input } => {
            let source = read_input(input.as_deref())?;
            let nodes = parse_document(cli, &source);
            let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
            let matches = find_tags(&nodes, &tags);
            log::info!(target: "tagtree", "{} matching elements", matches.len());
            let config = RenderConfig::default();
            for node in matches {
                render(&config, out, std::slice::from_ref(node))?;
                out.write_all(b"\n")?;
            }
        }
        Command::Tree { json, cap, file } => {
            let source = read_input(file.as_deref())?;
            let nodes = parse_document(cli, &source);
            if *json {
                serde_json::to_writer_pretty(&mut *out, &nodes).map_err(CliError::Json)?;
                out.write_all(b"\n")?;
            } else {
                for line in outline(&nodes, *cap) {
                    writeln!(out, "{line}")?;
                }
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if !cli.quiet {
        env_logger::Builder::from_env(Env::default().default_filter_or(match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }))
        .format_timestamp(None)
        .init();
    }

    let stdout = io::stdout();
    let result = if stdout.is_terminal() {
        run(&cli, &mut stdout.lock())
    } else {
        run(&cli, &mut io::BufWriter::new(stdout.lock()))
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("tagtree: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn include_root_prefers_explicit_dir() {
        let root = include_root_for(Some(Path::new("/srv/parts")), Some(Path::new("docs/a.html")));
        assert_eq!(root, PathBuf::from("/srv/parts"));
    }

    #[test]
    fn include_root_defaults_to_input_directory() {
        assert_eq!(
            include_root_for(None, Some(Path::new("docs/pages/a.html"))),
            PathBuf::from("docs/pages")
        );
        assert_eq!(
            include_root_for(None, Some(Path::new("a.html"))),
            PathBuf::from(".")
        );
    }

    #[test]
    fn include_root_for_stdin_is_current_dir() {
        assert_eq!(include_root_for(None, None), PathBuf::from("."));
        assert_eq!(include_root_for(None, Some(Path::new("-"))), PathBuf::from("."));
    }

    #[test]
    fn cli_parses_find_and_render_flags() {
        let cli = Cli::try_parse_from([
            "tagtree", "-vv", "--close-on", "td", "find", "a", "img", "--input", "x.html",
        ])
        .expect("valid command line");
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.close_on, vec!["td".to_string()]);
        match cli.command {
            Command::Find { tags, input } => {
                assert_eq!(tags, vec!["a".to_string(), "img".to_string()]);
                assert_eq!(input, Some(PathBuf::from("x.html")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
