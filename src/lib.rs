use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod blanks;
pub mod models;
pub mod store;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

pub async fn run() -> std::io::Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    #[derive(OpenApi)]
    #[openapi(
        paths(
            crate::blanks::handlers::get_groups,
            crate::blanks::handlers::expand_group,
            crate::blanks::handlers::render_permit,
            crate::blanks::handlers::render_voucher,
            crate::blanks::handlers::get_print_settings
        ),
        components(
            schemas(
                models::BlankVariant,
                models::Hunter,
                models::ResourceRow,
                models::SavedGroup,
                models::PrintConfig,
                models::FormValues,
                blanks::handlers::ExpandGroupRequest,
                blanks::handlers::GroupExpansionResponse,
                blanks::handlers::TruncationRequired,
                blanks::handlers::PermitRenderRequest,
                blanks::handlers::VoucherRenderRequest,
                blanks::handlers::PrintSettingsResponse,
                ErrorResponse,
            )
        ),
        tags(
            (name = "Blank Service", description = "Hunting blank stamping endpoints.")
        ),
        servers(
            (url = "http://127.0.0.1:8080", description = "Localhost server")
        )
    )]
    struct ApiDoc;

    let store = match store::ConfigStore::open(store::ConfigStore::default_path()) {
        Ok(store) => store,
        Err(e) => {
            log::error!(
                "Failed to read the print config file. Please check HUNT_PERMIT_CONFIG or data/print_config.json. Error: {}",
                e
            );
            std::process::exit(1);
        }
    };

    let state = match blanks::handlers::BlanksState::new(store) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!("Failed to load the stamping font from static/fonts. Error: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("Starting server at http://0.0.0.0:8080");

    HttpServer::new(move || {
        let state = state.clone();
        let cors = Cors::default()
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://localhost:8080")
            .allowed_origin("http://127.0.0.1:8080")
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(cors)
            .app_data(state)
            // Voucher backgrounds arrive base64-encoded in the JSON body.
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024))
            .service(web::scope("/api").configure(blanks::handlers::config))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind(("0.0.0.0", 8080))?
    .run()
    .await
}
