use axum::Json;
use serde::Serialize;

use crate::templates::{catalog, Template};

#[derive(Serialize)]
pub struct TemplateView {
    #[serde(flatten)]
    pub template: Template,
    pub class_names: String,
}

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<Vec<TemplateView>> {
    Json(
        catalog()
            .iter()
            .map(|t| TemplateView {
                template: *t,
                class_names: t.class_names(),
            })
            .collect(),
    )
}
