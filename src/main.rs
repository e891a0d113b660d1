#![allow(missing_docs)]

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    basket_scout::run().await
}
