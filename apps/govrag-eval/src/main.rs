// crates.io
use clap::Parser;
// self
use govrag_eval::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = Args::parse();
	govrag_eval::run(args).await
}
