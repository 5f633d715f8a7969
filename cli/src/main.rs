//! docsim CLI - document similarity and PDF highlighting tool

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;

use docsim::{
    records_to_json, sniff_doc_type_from_path, Analyzer, AnalyzerOptions, DocType,
    DocumentSource, JsonFormat, MatchRecord, NormalizeOptions, WordVectors,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "docsim")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Score document similarity and highlight words in PDFs", long_about = None)]
struct Cli {
    /// Word vectors file (GloVe or word2vec text format)
    #[arg(long, global = true, env = "DOCSIM_VECTORS", value_name = "FILE")]
    vectors: Option<PathBuf>,

    #[command(flatten)]
    normalize: NormalizeArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct NormalizeArgs {
    /// Keep stopwords when normalizing text
    #[arg(long, global = true)]
    no_stopwords: bool,

    /// Keep letter case when normalizing text
    #[arg(long, global = true)]
    keep_case: bool,
}

impl NormalizeArgs {
    fn options(&self) -> NormalizeOptions {
        NormalizeOptions::standard()
            .with_stopwords_removed(!self.no_stopwords)
            .with_lowercase(!self.keep_case)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// TF-IDF cosine similarity of two documents
    Lexical {
        #[arg(value_name = "FIRST")]
        first: PathBuf,

        #[arg(value_name = "SECOND")]
        second: PathBuf,

        /// Document type (detected from content if not specified)
        #[arg(short = 't', long = "type", value_enum)]
        doc_type: Option<DocKind>,
    },

    /// Word-vector similarity of two documents
    Semantic {
        #[arg(value_name = "FIRST")]
        first: PathBuf,

        #[arg(value_name = "SECOND")]
        second: PathBuf,

        /// Document type (detected from content if not specified)
        #[arg(short = 't', long = "type", value_enum)]
        doc_type: Option<DocKind>,
    },

    /// Similarity of a document to a category word or phrase
    #[command(alias = "cat")]
    Category {
        /// Category word or phrase
        category: String,

        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Document type (detected from content if not specified)
        #[arg(short = 't', long = "type", value_enum)]
        doc_type: Option<DocKind>,
    },

    /// Words closest to WORD in the vector table
    Related {
        word: String,

        /// Number of words to list
        #[arg(short = 'n', long, default_value = "50")]
        count: usize,
    },

    /// Tokens of a document equal to PATTERN (case-insensitive)
    Match {
        pattern: String,

        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Document type (detected from content if not specified)
        #[arg(short = 't', long = "type", value_enum)]
        doc_type: Option<DocKind>,

        /// Print match records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Highlight every occurrence of PATTERN in a PDF
    #[command(alias = "hl")]
    Highlight {
        #[arg(value_name = "PDF")]
        input: PathBuf,

        pattern: String,
    },

    /// Highlight words shared by two PDFs in both files
    Similar {
        #[arg(value_name = "FIRST")]
        first: PathBuf,

        #[arg(value_name = "SECOND")]
        second: PathBuf,
    },

    /// Highlight PATTERN in a PDF and list its token matches
    Pattern {
        pattern: String,

        #[arg(value_name = "PDF")]
        input: PathBuf,

        /// Print match records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum DocKind {
    /// PDF document
    Pdf,
    /// UTF-8 plain text
    #[value(alias = "txt")]
    Text,
}

impl From<DocKind> for DocType {
    fn from(kind: DocKind) -> Self {
        match kind {
            DocKind::Pdf => DocType::Pdf,
            DocKind::Text => DocType::Text,
        }
    }
}

impl Commands {
    fn needs_vectors(&self) -> bool {
        matches!(
            self,
            Commands::Semantic { .. } | Commands::Category { .. } | Commands::Related { .. }
        )
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}", format!("Error: {}", e).red().bold());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    if let Commands::Version = cli.command {
        cmd_version();
        return Ok(());
    }

    let vectors = if cli.command.needs_vectors() {
        load_vectors(cli.vectors.as_deref())?
    } else {
        WordVectors::default()
    };

    let mut options = AnalyzerOptions::new().with_normalize(cli.normalize.options());
    if let Commands::Related { count, .. } = cli.command {
        options = options.with_neighbors(count);
    }
    let analyzer = Analyzer::with_options(&vectors, options);

    match cli.command {
        Commands::Lexical {
            first,
            second,
            doc_type,
        } => cmd_lexical(&analyzer, &first, &second, doc_type),
        Commands::Semantic {
            first,
            second,
            doc_type,
        } => cmd_semantic(&analyzer, &first, &second, doc_type),
        Commands::Category {
            category,
            input,
            doc_type,
        } => cmd_category(&analyzer, &category, &input, doc_type),
        Commands::Related { word, .. } => cmd_related(&analyzer, &word),
        Commands::Match {
            pattern,
            input,
            doc_type,
            json,
        } => cmd_match(&analyzer, &pattern, &input, doc_type, json),
        Commands::Highlight { input, pattern } => cmd_highlight(&analyzer, &input, &pattern),
        Commands::Similar { first, second } => cmd_similar(&analyzer, &first, &second),
        Commands::Pattern {
            pattern,
            input,
            json,
        } => cmd_pattern(&analyzer, &pattern, &input, json),
        Commands::Version => Ok(()),
    }
}

fn load_vectors(path: Option<&Path>) -> CliResult<WordVectors> {
    let path = path.ok_or("word vectors required: pass --vectors <FILE> or set DOCSIM_VECTORS")?;
    Ok(WordVectors::load(path)?)
}

/// Explicit type, or the type sniffed from the file's leading bytes.
fn resolve_doc_type(kind: Option<DocKind>, input: &Path) -> CliResult<DocType> {
    match kind {
        Some(kind) => Ok(kind.into()),
        None => {
            let detected = sniff_doc_type_from_path(input)?;
            log::debug!("Detected {} for {}", detected, input.display());
            Ok(detected)
        }
    }
}

fn cmd_lexical(
    analyzer: &Analyzer<'_>,
    first: &Path,
    second: &Path,
    kind: Option<DocKind>,
) -> CliResult<()> {
    let doc_type = resolve_doc_type(kind, first)?;
    let score = analyzer.lexical_similarity(
        doc_type,
        DocumentSource::path(first),
        DocumentSource::path(second),
    )?;
    println!("{} {}", "Lexical similarity:".bold(), score);
    Ok(())
}

fn cmd_semantic(
    analyzer: &Analyzer<'_>,
    first: &Path,
    second: &Path,
    kind: Option<DocKind>,
) -> CliResult<()> {
    let doc_type = resolve_doc_type(kind, first)?;
    let score = analyzer.semantic_similarity(
        doc_type,
        DocumentSource::path(first),
        DocumentSource::path(second),
    )?;
    println!("{}", score);
    Ok(())
}

fn cmd_category(
    analyzer: &Analyzer<'_>,
    category: &str,
    input: &Path,
    kind: Option<DocKind>,
) -> CliResult<()> {
    let doc_type = resolve_doc_type(kind, input)?;
    let message = analyzer.categorical_similarity(category, doc_type, DocumentSource::path(input))?;
    println!("{}", message);
    Ok(())
}

fn cmd_related(analyzer: &Analyzer<'_>, word: &str) -> CliResult<()> {
    for related in analyzer.related_words(word)? {
        println!("{}", related);
    }
    Ok(())
}

fn cmd_match(
    analyzer: &Analyzer<'_>,
    pattern: &str,
    input: &Path,
    kind: Option<DocKind>,
    json: bool,
) -> CliResult<()> {
    let doc_type = resolve_doc_type(kind, input)?;
    let records = analyzer.match_pattern(pattern, doc_type, DocumentSource::path(input))?;
    print_records(&records, json)
}

fn cmd_highlight(analyzer: &Analyzer<'_>, input: &Path, pattern: &str) -> CliResult<()> {
    let output = analyzer.highlight_pattern(input, pattern)?;
    println!("{} {}", "Highlighted".green(), output.display());
    Ok(())
}

fn cmd_similar(analyzer: &Analyzer<'_>, first: &Path, second: &Path) -> CliResult<()> {
    let (first_out, second_out) = analyzer
        .highlight_similar_words(DocumentSource::path(first), DocumentSource::path(second))?;
    println!("{} {}", "Highlighted".green(), first_out.display());
    println!("{} {}", "Highlighted".green(), second_out.display());
    Ok(())
}

fn cmd_pattern(analyzer: &Analyzer<'_>, pattern: &str, input: &Path, json: bool) -> CliResult<()> {
    let (output, records) = analyzer.pattern_interface(pattern, DocType::Pdf, input)?;
    if !json {
        println!("{} {}", "Highlighted".green(), output.display());
    }
    print_records(&records, json)
}

fn print_records(records: &[MatchRecord], json: bool) -> CliResult<()> {
    if json {
        println!("{}", records_to_json(records, JsonFormat::Pretty)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{}", "No matches".yellow());
        return Ok(());
    }
    for record in records {
        println!(
            "{:>6} {:>6}  {}",
            record.start.to_string().dimmed(),
            record.end.to_string().dimmed(),
            record.text
        );
    }
    println!("\n{} {} matches", "Done!".green().bold(), records.len());
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docsim".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document similarity and PDF highlighting tool");
    println!();
    println!("Library: docsim {}", docsim::VERSION.dimmed());
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_normalize_flags() {
        let args = NormalizeArgs {
            no_stopwords: true,
            keep_case: true,
        };
        let options = args.options();
        assert!(!options.remove_stopwords);
        assert!(!options.lowercase);
        assert!(options.strip_punctuation);
    }

    #[test]
    fn test_resolve_doc_type_sniffs_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"plain words").unwrap();
        assert_eq!(resolve_doc_type(None, file.path()).unwrap(), DocType::Text);
        assert_eq!(
            resolve_doc_type(Some(DocKind::Pdf), file.path()).unwrap(),
            DocType::Pdf
        );
    }

    #[test]
    fn test_vectors_required() {
        assert!(load_vectors(None).is_err());
    }

    #[test]
    fn test_parse_match_command() {
        let cli = Cli::try_parse_from(["docsim", "match", "cat", "a.txt", "--type", "txt", "--json"])
            .unwrap();
        match cli.command {
            Commands::Match {
                pattern,
                doc_type,
                json,
                ..
            } => {
                assert_eq!(pattern, "cat");
                assert!(doc_type == Some(DocKind::Text));
                assert!(json);
            }
            _ => panic!("expected match command"),
        }
    }
}
