use crate::services::reports::{error_response, SharedEngine};
use actix_web::{web, HttpResponse, Responder};

/// `GET /api/reports/preview/{template_name}`: the primitives the layout
/// backend would receive, as JSON. Nothing is written to disk.
pub(crate) async fn process(
    template_name: web::Path<String>,
    engine: web::Data<SharedEngine>,
) -> impl Responder {
    let name = template_name.into_inner();
    let engine = engine.get_ref().clone();

    match web::block(move || engine.preview(&name)).await {
        Ok(Ok(primitives)) => HttpResponse::Ok().json(primitives),
        Ok(Err(e)) => error_response(&e),
        Err(e) => HttpResponse::InternalServerError().body(format!("Preview aborted: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use crate::services::reports::configure_routes;
    use crate::services::reports::tests::seeded_engine;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use serde_json::json;

    #[actix_web::test]
    async fn returns_the_sample_primitives_as_json() {
        let (dir, _repo, engine) = seeded_engine();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(engine))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/reports/preview/RelatorioVendas")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let primitives = body.as_array().unwrap();

        assert_eq!(primitives.len(), 7);
        assert_eq!(primitives[0], json!({ "Title": "Relatório de Vendas - Janeiro/2024" }));
        assert_eq!(
            primitives[1],
            json!({ "LabelValueRow": { "label": "Vendedor:", "value": "João Silva" } })
        );
        assert_eq!(
            primitives[4],
            json!({
                "Table": {
                    "headers": ["Produto", "Quantidade", "Valor"],
                    "rows": [["Notebook Dell Inspiron 15", "12", "R$ 3.200,00"]]
                }
            })
        );
        assert_eq!(primitives[5], json!({ "TotalLine": "R$ 45.320,00" }));
        assert_eq!(
            primitives[6],
            json!({ "FooterLine": "Gerado em 2024-01-31 14:30:00 por DynamicReportEngine" })
        );
        assert!(!dir.path().join("Reports").exists());
    }

    #[actix_web::test]
    async fn unknown_template_is_not_found() {
        let (_dir, _repo, engine) = seeded_engine();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(engine))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/reports/preview/Missing")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
