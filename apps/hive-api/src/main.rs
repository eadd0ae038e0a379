use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = hive_api::Args::parse();

	hive_api::run(args).await
}
