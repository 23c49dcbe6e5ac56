use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::db::{NewTodo, Page, TodoChanges};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTodoRequest {
    #[validate(length(min = 1, max = 100, message = "title must be between 1 and 100 characters"))]
    pub title: String,
    #[validate(length(max = 255, message = "description must be at most 255 characters"))]
    #[serde(default)]
    pub description: String,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTodoRequest {
    #[validate(length(min = 1, max = 100, message = "title must be between 1 and 100 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 255, message = "description must be at most 255 characters"))]
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub due_date: Option<NaiveDate>,
}

impl From<CreateTodoRequest> for NewTodo {
    fn from(req: CreateTodoRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            due_date: req.due_date,
        }
    }
}

impl From<UpdateTodoRequest> for TodoChanges {
    fn from(req: UpdateTodoRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            completed: req.completed,
            due_date: req.due_date,
        }
    }
}

pub async fn list_todos(
    user: AuthenticatedUser,
    query: web::Query<ListQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let page = Page::new(query.skip, query.limit);
    let todos = state.repo.list_todos(user.account_id, page).await?;
    Ok(HttpResponse::Ok().json(todos))
}

pub async fn create_todo(
    user: AuthenticatedUser,
    req: web::Json<CreateTodoRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    req.validate()?;
    let todo = state
        .repo
        .create_todo(user.account_id, req.into_inner().into())
        .await?;

    info!("{} created todo {}", user.username, todo.id);
    Ok(HttpResponse::Created().json(todo))
}

pub async fn get_todo(
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let todo = state
        .repo
        .find_todo(user.account_id, path.into_inner())
        .await?
        .ok_or_else(AppError::todo_not_found)?;
    Ok(HttpResponse::Ok().json(todo))
}

pub async fn update_todo(
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateTodoRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    req.validate()?;
    let todo = state
        .repo
        .update_todo(user.account_id, path.into_inner(), req.into_inner().into())
        .await?
        .ok_or_else(AppError::todo_not_found)?;
    Ok(HttpResponse::Ok().json(todo))
}

pub async fn complete_todo(
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let todo = state
        .repo
        .complete_todo(user.account_id, path.into_inner())
        .await?
        .ok_or_else(AppError::todo_not_found)?;
    Ok(HttpResponse::Ok().json(todo))
}

/// Accepts the completion and applies it on a detached task.
///
/// Ownership is checked before answering, so a 202 only ever refers to the
/// caller's own todo. The task has no retry; a failure is only logged.
pub async fn schedule_completion(
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let todo_id = path.into_inner();
    let owner = user.account_id;

    state
        .repo
        .find_todo(owner, todo_id)
        .await?
        .ok_or_else(AppError::todo_not_found)?;

    let repo = state.repo.clone();
    tokio::spawn(async move {
        match repo.complete_todo(owner, todo_id).await {
            Ok(Some(_)) => info!("Background completion applied to todo {}", todo_id),
            Ok(None) => info!("Todo {} vanished before background completion", todo_id),
            Err(e) => error!("Background completion failed for todo {}: {}", todo_id, e),
        }
    });

    Ok(HttpResponse::Accepted().json(serde_json::json!({
        "message": "Todo completion scheduled"
    })))
}

pub async fn delete_todo(
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let todo_id = path.into_inner();
    if !state.repo.delete_todo(user.account_id, todo_id).await? {
        return Err(AppError::todo_not_found());
    }

    info!("{} deleted todo {}", user.username, todo_id);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Todo deleted successfully"
    })))
}
