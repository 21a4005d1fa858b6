// crates.io
use clap::Parser;
// self
use govrag_chat::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = Args::parse();
	govrag_chat::run(args).await
}
