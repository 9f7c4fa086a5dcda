use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    hyperion_streamer_listener::run().await?;
    Ok(())
}
