use log::info;
use mongodb::{Client, Database, bson::doc, error::Result};

/// Connects to `uri` and checks the server answers before handing out the database.
pub async fn get_database(uri: &str, name: &str) -> Result<Database> {
    let client = Client::with_uri_str(uri).await?;
    let db = client.database(name);
    db.run_command(doc! { "ping": 1 }).await?;
    info!("Connected to MongoDB database `{}`", name);
    Ok(db)
}
