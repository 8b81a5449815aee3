#[tokio::main]
async fn main() -> anyhow::Result<()> {
    nexusone_server::start().await
}
