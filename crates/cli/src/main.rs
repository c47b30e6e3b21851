use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    wordscan_cli::main_entry().await
}
