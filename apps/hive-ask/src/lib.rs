use std::{
	fmt::Write as _,
	fs,
	io::{self, Write},
	path::{Path, PathBuf},
};

use clap::Parser;
use color_eyre::eyre::{self, WrapErr};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use hive_domain::{Document, DocumentPayload};
use hive_service::{AskResponse, HiveService, Outcome};

#[derive(Debug, Parser)]
#[command(
	version = hive_cli::VERSION,
	rename_all = "kebab",
	styles = hive_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Document JSON with a `sections` array of passages.
	#[arg(long, short = 'd', value_name = "FILE")]
	pub document: PathBuf,
	/// Question to answer. Repeatable. Questions are read from stdin, one per line, when omitted.
	#[arg(long, short = 'q', value_name = "TEXT")]
	pub question: Vec<String>,
	/// Print each response as a JSON line instead of text.
	#[arg(long)]
	pub json: bool,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = hive_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	// Stdout carries answers only.
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

	let service = HiveService::new(config);
	let summary = service.load_document(load_document(&args.document)?)?;

	tracing::info!(
		path = %args.document.display(),
		passages = summary.passages,
		dimensions = summary.dimensions,
		"Document loaded."
	);

	let mut out = io::stdout();

	if args.question.is_empty() {
		answer_lines(&service, BufReader::new(tokio::io::stdin()), &mut out, args.json).await?;
	} else {
		for question in &args.question {
			answer_one(&service, question, &mut out, args.json).await?;
		}
	}

	Ok(())
}

pub fn load_document(path: &Path) -> color_eyre::Result<Document> {
	let raw = fs::read_to_string(path)
		.wrap_err_with(|| format!("Failed to read document {}.", path.display()))?;
	let payload: DocumentPayload = serde_json::from_str(&raw)
		.wrap_err_with(|| format!("Failed to parse document {}.", path.display()))?;

	Document::from_payload(payload)
		.map_err(|err| eyre::eyre!("Invalid document {}: {err}", path.display()))
}

/// Answers every non-blank line from `reader`. Returns how many questions were asked.
pub async fn answer_lines<R, W>(
	service: &HiveService,
	reader: R,
	out: &mut W,
	json: bool,
) -> color_eyre::Result<usize>
where
	R: AsyncBufRead + Unpin,
	W: Write,
{
	let mut lines = reader.lines();
	let mut asked = 0;

	while let Some(line) = lines.next_line().await? {
		let question = line.trim();

		if question.is_empty() {
			continue;
		}

		answer_one(service, question, out, json).await?;

		asked += 1;
	}

	Ok(asked)
}

async fn answer_one<W>(
	service: &HiveService,
	question: &str,
	out: &mut W,
	json: bool,
) -> color_eyre::Result<()>
where
	W: Write,
{
	let response = service.ask(question).await;

	if json {
		writeln!(out, "{}", serde_json::to_string(&response)?)?;
	} else {
		write!(out, "{}", render(&response))?;
	}

	out.flush()?;

	Ok(())
}

pub fn render(response: &AskResponse) -> String {
	let mut text = format!("Q: {}\n", response.query);

	for hit in &response.results {
		let _ = writeln!(
			text,
			"  [{}] {}  (similarity {:.3}, distance {:.3})",
			hit.hop,
			hit.label(),
			hit.similarity,
			hit.distance
		);
	}

	match &response.outcome {
		Outcome::Answered { answer } => {
			let _ = writeln!(text, "A: {answer}");
		},
		Outcome::NoAnswer { kind, message } => {
			let _ = writeln!(text, "No answer ({}): {message}", kind.as_str());
		},
		Outcome::Superseded { latest_generation } => {
			let _ = writeln!(text, "Superseded by question #{latest_generation}.");
		},
	}

	text.push('\n');

	text
}
