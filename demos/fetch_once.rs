use std::error::Error;

use vpcview::client::{ClientOptions, InventoryClient};
use vpcview::display;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let client = InventoryClient::new(ClientOptions {
        url: std::env::var("INVENTORY_API_URL").unwrap_or_default(),
        ..ClientOptions::default()
    })?;

    match client.fetch_inventory().await {
        Ok(doc) => {
            println!("VPCs: {}", doc.vpcs.len());
            println!("Subnets: {}", doc.subnets.len());
            println!("{}", display::compose(&doc));
        }
        Err(err) => println!("{}", display::error_message(&err)),
    }

    Ok(())
}
