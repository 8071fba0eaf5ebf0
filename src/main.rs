#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rpg_rankings_lib::run().await
}
