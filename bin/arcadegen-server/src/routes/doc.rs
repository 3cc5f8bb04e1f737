use utoipa::OpenApi;

use crate::routes::{games, generate, health};

#[derive(OpenApi)]
#[openapi(info(
    title = "arcadegen-server",
    description = "Generate, store and replay browser games from text prompts",
    version = "0.1.0"
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(generate::GenerateApi::openapi());
    root.merge(games::GamesApi::openapi());
    root
}
