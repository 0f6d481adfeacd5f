//! Print the OpenAPI document as JSON.

use std::io;

use incident_backend::doc::ApiDoc;
use utoipa::OpenApi;

fn main() -> io::Result<()> {
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .map_err(|e| io::Error::other(format!("serialise OpenAPI document: {e}")))?;
    println!("{json}");
    Ok(())
}
