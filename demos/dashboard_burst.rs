use std::error::Error;

use vpcview::client::{ClientOptions, InventoryClient};
use vpcview::display::{Dashboard, SequencingPolicy, Update};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let client = InventoryClient::new(ClientOptions {
        url: std::env::var("INVENTORY_API_URL").unwrap_or_default(),
        ..ClientOptions::default()
    })?;
    let mut dashboard = Dashboard::new(client, SequencingPolicy::LatestRequest);

    for _ in 0..3 {
        dashboard.trigger();
    }
    for update in dashboard.settle().await {
        match update {
            Update::Shown { generation } => println!("#{generation} shown"),
            Update::Stale { generation } => println!("#{generation} discarded"),
            Update::Lost { generation } => println!("#{generation} lost"),
        }
    }
    println!("{}", dashboard.region().to_html());

    Ok(())
}
