use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, info_span, warn};

use merger_core::{
    DedupMode, InspectReport, Keep, MergeOptions, MergeOutcome, MergePipeline, SourceTable,
};
use merger_ingest::{OutputFormat, collect_inputs, read_file, write_table};
use merger_map::{
    AliasRegistry, ColumnResolver, NormalizedKey, RegistryOrigin, RegistryStore, export_template,
};

use crate::cli::{
    DiagnoseArgs, InspectArgs, KeepArg, MappingCommand, MergeArgs, OutputFormatArg,
};
use crate::diagnose::render_sheet;
use crate::summary::registry_table;

/// Base name of the default output file.
pub const DEFAULT_OUTPUT_STEM: &str = "merged";

/// Sources read from the inputs, plus the files that could not be read.
#[derive(Debug, Default)]
pub struct LoadedInputs {
    pub sources: Vec<SourceTable>,
    pub failures: Vec<(PathBuf, String)>,
}

/// Result of the `merge` subcommand.
#[derive(Debug)]
pub struct MergeRun {
    pub outcome: MergeOutcome,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub failures: Vec<(PathBuf, String)>,
}

pub fn open_store(path: Option<&Path>) -> RegistryStore {
    path.map_or_else(RegistryStore::default_location, |p| RegistryStore::new(p.to_path_buf()))
}

/// Loads the registry; a damaged document is reported and replaced by the
/// built-in defaults.
pub fn load_registry(store: &RegistryStore) -> AliasRegistry {
    let load = store.load();
    if let Some(warning) = &load.warning {
        eprintln!("warning: {warning}; using built-in column mappings");
    }
    load.registry
}

/// Reads every table of every input. A file that fails to read is recorded
/// and skipped.
pub fn load_sources(inputs: &[PathBuf]) -> Result<LoadedInputs> {
    let files = collect_inputs(inputs).context("collect input files")?;
    if files.is_empty() {
        bail!("no supported input files found");
    }
    let mut loaded = LoadedInputs::default();
    for path in files {
        let file_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        match read_file(&path) {
            Ok(sheets) => {
                loaded.sources.extend(
                    sheets
                        .into_iter()
                        .map(|sheet| SourceTable::new(file_name.clone(), sheet.name, sheet.table)),
                );
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "Skipping unreadable file");
                loaded.failures.push((path, error.to_string()));
            }
        }
    }
    Ok(loaded)
}

pub fn merge_options(args: &MergeArgs) -> MergeOptions {
    let keys = clean_names(&args.dedup_keys);
    let dedup = if !keys.is_empty() {
        DedupMode::Keys(keys)
    } else if args.dedup {
        DedupMode::FullRow
    } else {
        DedupMode::Off
    };
    MergeOptions {
        normalize_columns: !args.no_normalize,
        fuzzy: args.fuzzy,
        dedup,
        keep: match args.keep {
            KeepArg::First => Keep::First,
            KeepArg::Last => Keep::Last,
            KeepArg::None => Keep::None,
        },
        exclude_columns: clean_names(&args.exclude).into_iter().collect::<BTreeSet<_>>(),
        tag_sources: !args.no_source_columns,
    }
}

/// Output path and format: an explicit format wins, then the extension of
/// the output path, then xlsx.
pub fn output_target(
    output: Option<&Path>,
    format: Option<OutputFormatArg>,
) -> (PathBuf, OutputFormat) {
    let explicit = format.map(|f| match f {
        OutputFormatArg::Xlsx => OutputFormat::Xlsx,
        OutputFormatArg::Csv => OutputFormat::Csv,
    });
    match output {
        Some(path) => {
            let format = explicit
                .or_else(|| OutputFormat::from_path(path))
                .unwrap_or_default();
            (path.to_path_buf(), format)
        }
        None => {
            let format = explicit.unwrap_or_default();
            let path = PathBuf::from(format!("{DEFAULT_OUTPUT_STEM}.{}", format.extension()));
            (path, format)
        }
    }
}

pub fn run_merge(args: &MergeArgs, registry: &AliasRegistry) -> Result<MergeRun> {
    let span = info_span!("merge", inputs = args.inputs.len());
    let _guard = span.enter();

    let (output, format) = output_target(args.output.as_deref(), args.format);
    let loaded = load_sources(&args.inputs)?;
    let pipeline = MergePipeline::new(registry, merge_options(args));
    let outcome = pipeline
        .run(loaded.sources)
        .context("merge input tables")?;
    write_table(&outcome.table, &output, format)
        .with_context(|| format!("write {}", output.display()))?;
    info!(
        output = %output.display(),
        rows = outcome.table.height(),
        columns = outcome.table.width(),
        "Merge finished"
    );
    Ok(MergeRun {
        outcome,
        output,
        format,
        failures: loaded.failures,
    })
}

/// Machine-readable merge summary.
pub fn merge_json(run: &MergeRun) -> Result<String> {
    let value = serde_json::json!({
        "output": run.output.display().to_string(),
        "format": run.format,
        "merged_sources": run.outcome.merged_sources,
        "skipped": run.outcome.skipped,
        "removed_duplicates": run.outcome.removed_duplicates,
        "quality": run.outcome.quality,
        "mappings": run.outcome.mappings,
        "failures": run
            .failures
            .iter()
            .map(|(path, error)| serde_json::json!({
                "path": path.display().to_string(),
                "error": error,
            }))
            .collect::<Vec<_>>(),
    });
    serde_json::to_string_pretty(&value).context("serialize merge summary")
}

pub fn run_inspect(args: &InspectArgs, registry: &AliasRegistry) -> Result<InspectReport> {
    let loaded = load_sources(&args.inputs)?;
    report_failures(&loaded.failures);
    let options = MergeOptions {
        normalize_columns: !args.no_normalize,
        fuzzy: args.fuzzy,
        ..MergeOptions::default()
    };
    MergePipeline::new(registry, options)
        .inspect(loaded.sources)
        .context("inspect input tables")
}

/// Renders the diagnostics of every sheet of every input.
pub fn run_diagnose(args: &DiagnoseArgs, registry: &AliasRegistry) -> Result<String> {
    let files = collect_inputs(&args.inputs).context("collect input files")?;
    let resolver = ColumnResolver::new(registry);
    let mut out = String::new();
    for path in files {
        let file = path.display().to_string();
        let sheets = read_file(&path).with_context(|| format!("read {file}"))?;
        for sheet in sheets {
            let labels: Vec<String> = sheet
                .table
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            out.push_str(&render_sheet(&file, &sheet.name, &labels, &resolver, args.fuzzy));
            out.push('\n');
        }
    }
    Ok(out)
}

pub fn run_mapping(command: &MappingCommand, store: &RegistryStore) -> Result<()> {
    match command {
        MappingCommand::List => {
            let load = store.load();
            if let Some(warning) = &load.warning {
                eprintln!("warning: {warning}");
            }
            let origin = match load.origin {
                RegistryOrigin::File => "file",
                RegistryOrigin::Default => "built-in defaults",
            };
            println!("Registry: {} ({origin})", store.path().display());
            println!("{}", registry_table(&load.registry));
        }
        MappingCommand::Add { standard, aliases } => {
            let standard = standard.trim();
            if standard.is_empty() {
                bail!("standard name must not be empty");
            }
            let mut registry = load_registry(store);
            registry.add(standard, clean_names(aliases));
            save(store, &registry)?;
            println!("Saved {standard} to {}", store.path().display());
        }
        MappingCommand::Remove { standard } => {
            let mut registry = load_registry(store);
            if !registry.remove(standard) {
                println!("{standard} is not in the registry; nothing removed");
                return Ok(());
            }
            save(store, &registry)?;
            println!("Removed {standard}");
        }
        MappingCommand::Reset => {
            let mut registry = load_registry(store);
            registry.reset_to_default();
            save(store, &registry)?;
            println!("Restored built-in mappings in {}", store.path().display());
        }
        MappingCommand::Lookup { label, fuzzy } => {
            let registry = load_registry(store);
            let resolution = ColumnResolver::new(&registry).resolve(&[label.as_str()], *fuzzy);
            let key = NormalizedKey::new(label);
            for column in &resolution.columns {
                println!("{} [{key}] -> {} ({})", column.original, column.resolved, column.kind);
            }
        }
        MappingCommand::ExportTemplate { path } => {
            export_template(path).with_context(|| format!("write {}", path.display()))?;
            println!("Template written to {}", path.display());
        }
    }
    Ok(())
}

pub fn report_failures(failures: &[(PathBuf, String)]) {
    for (path, error) in failures {
        eprintln!("error: {}: {error}", path.display());
    }
}

fn save(store: &RegistryStore, registry: &AliasRegistry) -> Result<()> {
    store
        .save(registry)
        .with_context(|| format!("save registry to {}", store.path().display()))
}

fn clean_names(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
