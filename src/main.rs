//! Rowport CLI - transfer keyword-matched rows between spreadsheet tables
//!
//! # Main Commands
//!
//! ```bash
//! rowport transfer export.csv followup.csv -m mapping.json -c "Morning Status" -c "Evening Status"
//! rowport preview export.csv -m mapping.json -c "Morning Status"
//! rowport template list              # Manage mapping templates
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! rowport parse export.csv           # Just parse a table to JSON
//! rowport example-mapping            # Show an example mapping document
//! ```

use clap::{Parser, Subcommand};
use rowport::logs::LOGGER;
use rowport::{
    example_mapping, preview_matches, read_table_file, run_transfer, ColumnMapping,
    ConsoleProgress, CsvSink, MappingRegistry, MatchConfig, TransferOptions,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rowport")]
#[command(about = "Transfer keyword-matched rows between spreadsheet tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transfer matching rows from a source table into a destination table
    Transfer {
        /// Source table file
        source: PathBuf,

        /// Destination table file (existing rows are preserved)
        dest: PathBuf,

        /// Mapping JSON file
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// Use a stored mapping template instead of a file
        #[arg(short, long)]
        template: Option<String>,

        /// Monitored source column (repeatable)
        #[arg(short = 'c', long = "monitored")]
        monitored: Vec<String>,

        /// Override a keyword (repeatable; default list used otherwise)
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,

        /// Match configuration JSON file (keywords, monitored columns, time pattern)
        #[arg(long)]
        match_config: Option<PathBuf>,

        /// Run the pipeline without saving the destination
        #[arg(long)]
        dry_run: bool,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show which rows would transfer, without touching any destination
    Preview {
        /// Source table file
        source: PathBuf,

        /// Mapping JSON file
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// Use a stored mapping template instead of a file
        #[arg(short, long)]
        template: Option<String>,

        /// Monitored source column (repeatable)
        #[arg(short = 'c', long = "monitored")]
        monitored: Vec<String>,

        /// Override a keyword (repeatable)
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,

        /// Match configuration JSON file
        #[arg(long)]
        match_config: Option<PathBuf>,
    },

    /// Parse a table file and output JSON rows
    Parse {
        /// Input table file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show an example mapping document
    ExampleMapping,

    /// Manage mapping templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },
}

#[derive(Subcommand)]
enum TemplateAction {
    /// List all stored templates
    List,

    /// Import a mapping JSON file as template
    Import {
        /// Mapping JSON file to import
        file: PathBuf,
        /// Name for the template
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show details of a template
    Show {
        /// Template ID
        id: String,
    },

    /// Delete a template
    Delete {
        /// Template ID
        id: String,
    },

    /// Suggest stored templates compatible with a source table's columns
    Suggest {
        /// Source table file
        source: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Transfer {
            source,
            dest,
            mapping,
            template,
            monitored,
            keywords,
            match_config,
            dry_run,
            quiet,
        } => cmd_transfer(
            &source,
            &dest,
            mapping.as_deref(),
            template.as_deref(),
            monitored,
            keywords,
            match_config.as_deref(),
            dry_run,
            quiet,
        ),

        Commands::Preview {
            source,
            mapping,
            template,
            monitored,
            keywords,
            match_config,
        } => cmd_preview(
            &source,
            mapping.as_deref(),
            template.as_deref(),
            monitored,
            keywords,
            match_config.as_deref(),
        ),

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::ExampleMapping => cmd_example_mapping(),

        Commands::Template { action } => cmd_template(action),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Resolve the mapping from a file or a stored template.
fn load_mapping(
    mapping_path: Option<&Path>,
    template_id: Option<&str>,
) -> Result<ColumnMapping, Box<dyn std::error::Error>> {
    match (mapping_path, template_id) {
        (Some(path), _) => Ok(ColumnMapping::from_file(path)?),
        (None, Some(id)) => {
            let mut registry = MappingRegistry::new();
            let mapping = registry
                .get(id)
                .map(|t| t.mapping.clone())
                .ok_or_else(|| format!("Template not found: {}", id))?;
            registry.touch(id);
            Ok(mapping)
        }
        (None, None) => Err("Please provide a mapping (--mapping <file> or --template <id>)".into()),
    }
}

/// Build the match configuration from a file and CLI overrides.
fn build_match_config(
    config_path: Option<&Path>,
    monitored: Vec<String>,
    keywords: Vec<String>,
) -> Result<MatchConfig, Box<dyn std::error::Error>> {
    let mut config = match config_path {
        Some(path) => MatchConfig::from_file(path)?,
        None => MatchConfig::default(),
    };
    if !monitored.is_empty() {
        config.monitored_columns = monitored;
    }
    if !keywords.is_empty() {
        config.keywords = keywords;
    }
    Ok(config)
}

#[allow(clippy::too_many_arguments)]
fn cmd_transfer(
    source: &Path,
    dest: &Path,
    mapping_path: Option<&Path>,
    template_id: Option<&str>,
    monitored: Vec<String>,
    keywords: Vec<String>,
    match_config: Option<&Path>,
    dry_run: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    LOGGER.set_quiet(quiet);

    let mapping = load_mapping(mapping_path, template_id)?;
    let config = build_match_config(match_config, monitored, keywords)?;

    eprintln!("📄 Source: {}", source.display());
    let table = read_table_file(source)?;
    eprintln!(
        "   Encoding: {}, delimiter: '{}', rows: {}",
        table.encoding,
        format_delimiter(table.delimiter),
        table.row_count()
    );

    eprintln!("📄 Destination: {}", dest.display());
    let mut sink = CsvSink::open(dest)?;

    let summary = run_transfer(
        &table,
        &mut sink,
        &mapping,
        &config,
        &mut ConsoleProgress::default(),
        &TransferOptions { dry_run },
    )?;

    eprintln!(
        "\n✨ Done: {} row(s) inserted, {} skipped{}",
        summary.rows_inserted,
        summary.rows_skipped,
        if dry_run { " (dry run)" } else { "" }
    );
    Ok(())
}

fn cmd_preview(
    source: &Path,
    mapping_path: Option<&Path>,
    template_id: Option<&str>,
    monitored: Vec<String>,
    keywords: Vec<String>,
    match_config: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mapping = load_mapping(mapping_path, template_id)?;
    let config = build_match_config(match_config, monitored, keywords)?;

    let table = read_table_file(source)?;
    eprintln!("📄 {} rows in {}", table.row_count(), source.display());

    let matches = preview_matches(&table, &mapping, &config)?;

    if matches.is_empty() {
        eprintln!("No row matches.");
        return Ok(());
    }

    for (idx, outcome) in &matches {
        println!("Row {}:", idx + 1);
        for (column, text) in &outcome.extracted {
            println!("  {} → {}", column, text);
        }
    }
    eprintln!("\n{} of {} rows would transfer", matches.len(), table.row_count());
    Ok(())
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing: {}", input.display());

    let table = read_table_file(input)?;
    eprintln!("   Encoding: {}", table.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(table.delimiter));
    eprintln!("   Columns: {}", table.headers.join(", "));
    eprintln!("✅ Parsed {} rows", table.row_count());

    let json = serde_json::to_string_pretty(&table.rows)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_example_mapping() -> Result<(), Box<dyn std::error::Error>> {
    let mapping = example_mapping();
    println!("{}", mapping.to_json()?);
    Ok(())
}

fn cmd_template(action: TemplateAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = MappingRegistry::new();

    match action {
        TemplateAction::List => {
            let templates = registry.list();
            if templates.is_empty() {
                eprintln!("📋 No templates stored yet.");
                eprintln!("   Use 'rowport template import <file>' to add one.");
                return Ok(());
            }

            eprintln!("📋 Stored templates ({}):\n", templates.len());
            for t in templates {
                println!("  📄 {} ({})", t.name, t.id);
                println!("     Columns: {}", t.source_columns.join(", "));
                println!("     Uses: {}", t.use_count);
                if let Some(ref last) = t.last_used {
                    println!("     Last used: {}", last);
                }
                println!();
            }
        }

        TemplateAction::Import { file, name } => {
            let template_name = name.as_deref().unwrap_or_else(|| {
                file.file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("imported")
            });

            eprintln!("📥 Importing template from: {}", file.display());
            let id = registry.import(&file, Some(template_name))?;
            eprintln!("✅ Template saved with ID: {}", id);
        }

        TemplateAction::Show { id } => match registry.get(&id) {
            Some(t) => {
                println!("📄 Template: {} ({})\n", t.name, t.id);
                println!("Source columns: {}", t.source_columns.join(", "));
                println!("Created: {}", t.created_at);
                println!("Uses: {}", t.use_count);
                println!("\nMapping:");
                println!("{}", t.mapping.to_json()?);
            }
            None => {
                return Err(format!("Template not found: {}", id).into());
            }
        },

        TemplateAction::Delete { id } => {
            registry.delete(&id)?;
            eprintln!("🗑️  Template deleted: {}", id);
        }

        TemplateAction::Suggest { source } => {
            let table = read_table_file(&source)?;
            let compatible = registry.find_compatible(&table.headers);

            if compatible.is_empty() {
                eprintln!("No compatible template for {}", source.display());
                return Ok(());
            }

            eprintln!("📋 Compatible templates for {}:\n", source.display());
            for (t, score) in compatible {
                println!("  📄 {} ({}) — {:.0}% column match", t.name, t.id, score * 100.0);
            }
        }
    }

    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
