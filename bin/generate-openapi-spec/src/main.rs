//! Generate `OpenAPI` specification for the procedure count API

use api::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), serde_json::Error> {
    let openapi = ApiDoc::openapi();
    println!("{}", serde_json::to_string_pretty(&openapi)?);
    Ok(())
}
