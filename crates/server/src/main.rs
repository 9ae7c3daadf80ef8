#[tokio::main]
async fn main() -> anyhow::Result<()> {
    consulta_server::start().await
}
