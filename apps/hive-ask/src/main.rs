use clap::Parser;

use hive_ask::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	hive_ask::run(args).await
}
