use crate::{
    api::{
        error::{json_error_handler, query_error_handler},
        leave_request, stats,
    },
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::Condition, web};

type Limiter = Condition<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

// Per-route limiter; a rate of 0 turns it off
fn build_limiter(requests_per_min: u32) -> Limiter {
    let config = (requests_per_min > 0)
        .then(|| {
            let per_ms = (60_000 / u64::from(requests_per_min)).max(1);
            GovernorConfigBuilder::default()
                .per_millisecond(per_ms)
                .burst_size(requests_per_min)
                .key_extractor(PeerIpKeyExtractor)
                .finish()
        })
        .flatten();

    match config {
        Some(cfg) => Condition::new(true, Governor::new(&cfg)),
        None => Condition::new(false, Governor::new(&GovernorConfig::default())),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler));
    cfg.app_data(web::QueryConfig::default().error_handler(query_error_handler));

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(build_limiter(config.rate_api_per_min))
            .service(
                web::scope("/leaves")
                    // /leaves
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // fixed segments before /{id}
                    .service(web::resource("/search").route(web::get().to(leave_request::search_leaves)))
                    .service(
                        web::resource("/batch")
                            .wrap(build_limiter(config.rate_batch_per_min))
                            .route(web::post().to(leave_request::batch_leaves)),
                    )
                    .service(
                        web::resource("/employee/{employee_id}")
                            .route(web::get().to(leave_request::employee_leaves)),
                    )
                    // /leaves/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(leave_request::get_leave))
                            .route(web::put().to(leave_request::update_leave))
                            .route(web::delete().to(leave_request::delete_leave)),
                    )
                    // /leaves/{id}/approve
                    .service(
                        web::resource("/{id}/approve").route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leaves/{id}/reject
                    .service(
                        web::resource("/{id}/reject").route(web::put().to(leave_request::reject_leave)),
                    ),
            )
            .service(web::resource("/stats").route(web::get().to(stats::leave_stats)))
            .service(
                web::resource("/employees/{employee_id}/summary")
                    .route(web::get().to(stats::employee_summary)),
            ),
    );
}
