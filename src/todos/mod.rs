//! Owner-scoped todo endpoints.
//!
//! A todo owned by another account answers exactly like a missing one:
//! 404 "Todo not found".

pub mod handlers;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(vec!["/todos", "/todos/"])
            .route(web::get().to(handlers::list_todos))
            .route(web::post().to(handlers::create_todo)),
    )
    .service(
        web::resource("/todos/{todo_id}")
            .route(web::get().to(handlers::get_todo))
            .route(web::put().to(handlers::update_todo))
            .route(web::delete().to(handlers::delete_todo)),
    )
    .service(
        web::resource("/todos/{todo_id}/complete")
            .route(web::put().to(handlers::complete_todo))
            .route(web::post().to(handlers::schedule_completion)),
    );
}
