#[tokio::main]
async fn main() -> anyhow::Result<()> {
    floatchat::run().await
}
