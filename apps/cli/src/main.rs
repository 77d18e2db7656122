use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kb_file_ext::mime;
use kb_thumbnailer::{
	CapabilitySet, RenderTier, ResourceType, SourceFile, Thumbnailer, ThumbnailerConfig,
};
use serde::Serialize;
use std::{io, path::PathBuf};
use tracing::debug;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
	Human,
	Json,
}

#[derive(Parser, Debug)]
#[command(name = "kb-thumb", version, about = "Bounded size previews for arbitrary files")]
struct Cli {
	/// TOML configuration file, `KB_THUMB_*` variables override it
	#[arg(long, global = true, env = "KB_THUMB_CONFIG")]
	config: Option<PathBuf>,

	/// Output format
	#[arg(long, global = true, value_enum, default_value = "human")]
	format: OutputFormat,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Generate a preview and print it as a data URI
	Generate(GenerateArgs),
	/// Probe and list the available rendering backends
	Capabilities,
}

#[derive(Parser, Debug, Clone)]
struct GenerateArgs {
	/// File to preview
	path: PathBuf,

	/// Declared resource type: image, pdf, video, document or anything else
	#[arg(long = "type", default_value = "other")]
	resource_type: String,

	/// MIME type, guessed from the extension when missing
	#[arg(long)]
	mime: Option<String>,

	/// Name printed on placeholders, the file name by default
	#[arg(long)]
	name: Option<String>,
}

#[derive(Serialize)]
struct GenerateOutput {
	path: PathBuf,
	resource_type: ResourceType,
	mime_type: String,
	tier: RenderTier,
	data_uri: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
	init_tracing();

	let cli = Cli::parse();

	let config = ThumbnailerConfig::load(cli.config.as_deref()).with_context(|| {
		cli.config.as_ref().map_or_else(
			|| String::from("invalid configuration"),
			|path| format!("loading configuration from {}", path.display()),
		)
	})?;
	debug!(?config, "Loaded configuration");

	let thumbnailer = Thumbnailer::new(config);

	match cli.command {
		Commands::Generate(args) => generate(&thumbnailer, args, cli.format).await,
		Commands::Capabilities => {
			print_capabilities(&thumbnailer.capabilities().await, cli.format)
		}
	}
}

// Logs go to stderr, stdout only carries the result
fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_writer(io::stderr)
		.with_env_filter(
			EnvFilter::builder()
				.with_default_directive(LevelFilter::INFO.into())
				.from_env_lossy(),
		)
		.try_init();
}

async fn generate(thumbnailer: &Thumbnailer, args: GenerateArgs, format: OutputFormat) -> Result<()> {
	let mime_type = args
		.mime
		.unwrap_or_else(|| mime::guess_from_path(&args.path).to_owned());

	let mut source = SourceFile::new(args.path, ResourceType::parse(&args.resource_type), mime_type);
	if let Some(name) = args.name {
		source = source.with_original_name(name);
	}

	let (tier, data_uri) = match thumbnailer.preview(&source).await {
		Some(preview) => (preview.tier, Some(thumbnailer.encode(&source, &preview).await)),
		None => (RenderTier::None, None),
	};

	match format {
		OutputFormat::Human => println!("{}", data_uri.as_deref().unwrap_or("null")),
		OutputFormat::Json => println!(
			"{}",
			serde_json::to_string_pretty(&GenerateOutput {
				path: source.path,
				resource_type: source.resource_type,
				mime_type: source.mime_type,
				tier,
				data_uri,
			})?
		),
	}

	Ok(())
}

fn print_capabilities(capabilities: &CapabilitySet, format: OutputFormat) -> Result<()> {
	match format {
		OutputFormat::Human => {
			let yes_no = |available| if available { "yes" } else { "no" };

			println!("raster library:   {}", yes_no(capabilities.has_raster_lib));
			println!("headless canvas:  {}", yes_no(capabilities.has_headless_canvas));
			println!("pdf parser:       {}", yes_no(capabilities.has_pdf_parser));
			println!("video transcoder: {}", yes_no(capabilities.has_video_transcoder));
		}
		OutputFormat::Json => println!("{}", serde_json::to_string_pretty(capabilities)?),
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	use clap::CommandFactory;

	#[test]
	fn cli_definition_is_consistent() {
		Cli::command().debug_assert();
	}

	#[test]
	fn parses_generate() {
		let cli = Cli::parse_from([
			"kb-thumb",
			"generate",
			"/tmp/report.pdf",
			"--type",
			"pdf",
			"--format",
			"json",
		]);

		assert!(matches!(cli.format, OutputFormat::Json));
		let Commands::Generate(args) = cli.command else {
			panic!("expected the generate command");
		};
		assert_eq!(args.path, PathBuf::from("/tmp/report.pdf"));
		assert_eq!(args.resource_type, "pdf");
		assert_eq!(args.mime, None);
	}
}
