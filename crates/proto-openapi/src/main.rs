//! `protoc-gen-openapi`: OpenAPI 3.0.3 generator for annotated protobuf APIs.
//!
//! # Modes
//!
//! ```text
//! # As a protoc / buf plugin (request on stdin, response on stdout)
//! protoc --openapi_out=naming=proto,validate=true:out/ -I proto library/v1/library.proto
//!
//! # Standalone, from a descriptor set built with source info
//! buf build -o descriptor.bin
//! protoc-gen-openapi generate \
//!   --descriptor descriptor.bin \
//!   --file library/v1/library.proto \
//!   --cargo-toml Cargo.toml \
//!   --output api/openapi.yaml
//! ```
//!
//! Diagnostics go to stderr; set `RUST_LOG` (default `warn`) to see more.

#![forbid(unsafe_code)]

use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use prost::Message;
use proto_openapi::{
    build_document, render, Configuration, FileDescriptorSet, Naming, ProtoSet, OUTPUT_FILE,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// OpenAPI 3.0.3 generator for protobuf services with `google.api.http` bindings.
///
/// Without a subcommand, runs as a `protoc` plugin.
#[derive(Parser)]
#[command(name = "protoc-gen-openapi", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a document from a compiled `FileDescriptorSet`.
    Generate(GenerateArgs),
}

#[derive(Parser)]
struct GenerateArgs {
    /// Path to the compiled `FileDescriptorSet` (binary, with source info for comments).
    #[arg(short, long)]
    descriptor: PathBuf,

    /// Proto file names that contribute paths (all files when omitted).
    #[arg(short, long)]
    file: Vec<String>,

    /// Path to a YAML options file. CLI flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    version: VersionArgs,

    /// Document title.
    #[arg(long)]
    title: Option<String>,

    /// Document description.
    #[arg(long)]
    description: Option<String>,

    /// Naming mode: `proto` keeps protobuf identifiers, `json` uses camelCase.
    #[arg(long)]
    naming: Option<String>,

    /// Project `validate.rules` constraints onto schemas.
    #[arg(long)]
    validate: bool,

    /// Output path.
    #[arg(short, long, default_value = OUTPUT_FILE)]
    output: PathBuf,
}

/// Where `info.version` comes from. Neither flag keeps the options file value.
#[derive(Args, Debug, Default)]
#[group(multiple = false)]
struct VersionArgs {
    /// Document version.
    #[arg(long)]
    version: Option<String>,

    /// Take the document version from this crate or workspace manifest.
    #[arg(long)]
    cargo_toml: Option<PathBuf>,
}

impl VersionArgs {
    fn resolve(&self) -> anyhow::Result<Option<String>> {
        if let Some(version) = &self.version {
            return Ok(Some(version.clone()));
        }
        self.cargo_toml
            .as_deref()
            .map(|path| {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                manifest_version(&content)
                    .with_context(|| format!("No usable version in {}", path.display()))
            })
            .transpose()
    }
}

/// The parts of a `Cargo.toml` that can carry a version.
#[derive(Deserialize, Default)]
#[serde(default)]
struct Manifest {
    package: Option<ManifestPackage>,
    workspace: Option<ManifestWorkspace>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ManifestWorkspace {
    package: Option<ManifestPackage>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ManifestPackage {
    /// A string, or `{ workspace = true }` in member crates.
    version: Option<toml::Value>,
}

/// Literal version of the crate, falling back to the workspace's.
fn manifest_version(content: &str) -> anyhow::Result<String> {
    let manifest: Manifest = toml::from_str(content)?;
    let workspace = manifest.workspace.and_then(|w| w.package);

    [manifest.package, workspace]
        .into_iter()
        .flatten()
        .find_map(|p| p.version.and_then(|v| v.as_str().map(str::to_string)))
        .ok_or_else(|| anyhow::anyhow!("neither [package] nor [workspace.package] sets version"))
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    match Cli::parse().command {
        None => run_plugin(),
        Some(Command::Generate(args)) => run_generate(&args),
    }
}

/// Log to stderr; stdout belongs to the plugin protocol.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_plugin() -> anyhow::Result<()> {
    let mut input = Vec::new();
    std::io::stdin()
        .read_to_end(&mut input)
        .context("Failed to read plugin request from stdin")?;

    let output = proto_openapi::run(&input).context("Failed to decode CodeGeneratorRequest")?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&output)
        .context("Failed to write plugin response to stdout")?;
    stdout.flush().context("Failed to flush stdout")?;
    Ok(())
}

fn run_generate(args: &GenerateArgs) -> anyhow::Result<()> {
    let config = resolve_config(args)?;

    let bytes = fs::read(&args.descriptor)
        .with_context(|| format!("Failed to read descriptor: {}", args.descriptor.display()))?;
    let set = FileDescriptorSet::decode(bytes.as_slice())
        .with_context(|| format!("Failed to decode descriptor: {}", args.descriptor.display()))?;

    for name in &args.file {
        if !set.file.iter().any(|f| f.name.as_deref() == Some(name)) {
            bail!("File '{name}' not found in {}", args.descriptor.display());
        }
    }

    let pool = ProtoSet::new(&set.file, |name| {
        args.file.is_empty() || args.file.iter().any(|f| f == name)
    });
    let yaml = render(&build_document(&pool, &config)).context("Failed to render document")?;

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&args.output, yaml)
        .with_context(|| format!("Failed to write output: {}", args.output.display()))?;

    eprintln!("Wrote {}", args.output.display());
    Ok(())
}

/// Options file (or defaults), then CLI overrides.
fn resolve_config(args: &GenerateArgs) -> anyhow::Result<Configuration> {
    let mut config = match &args.config {
        Some(path) => Configuration::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Configuration::default(),
    };

    if let Some(version) = args.version.resolve()? {
        config.version = version;
    }
    if let Some(title) = &args.title {
        config.title.clone_from(title);
    }
    if let Some(description) = &args.description {
        config.description.clone_from(description);
    }
    if let Some(naming) = &args.naming {
        config.naming = Naming::parse(naming);
    }
    if args.validate {
        config.validate = true;
    }

    Ok(config)
}
