// src/routes.rs

use actix_web::{web, HttpResponse};

use crate::auth::{issue_token, logout};
use crate::middleware::Authentication;
use crate::task::{create_task, delete_task, edit_task, get_task, list_tasks, update_task_status};
use crate::user_management::{create_user, update_user};

async fn index() -> HttpResponse {
    HttpResponse::Ok().body("Hello from Task Management Server..")
}

/// Mounts every route. `/jwt` and `/logout` are public; `/users` and `/tasks`
/// sit behind [`Authentication`].
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index)).service(
        web::scope("/api/v1")
            .route("/jwt", web::post().to(issue_token))
            .route("/logout", web::get().to(logout))
            // USERS
            .service(
                web::scope("/users")
                    .wrap(Authentication)
                    .route("", web::post().to(create_user))
                    .route("/{email}", web::put().to(update_user)),
            )
            // TASKS
            .service(
                web::scope("/tasks")
                    .wrap(Authentication)
                    .route("", web::post().to(create_task))
                    .route("", web::get().to(list_tasks))
                    .route("/{id}", web::get().to(get_task))
                    .route("/{id}", web::delete().to(delete_task))
                    .route("/{id}", web::put().to(update_task_status))
                    .route("/{id}", web::patch().to(edit_task)),
            ),
    );
}
