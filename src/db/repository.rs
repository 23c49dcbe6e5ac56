use async_trait::async_trait;
use uuid::Uuid;

use crate::db::models::{Account, NewAccount, NewTodo, Page, Role, Todo, TodoChanges};
use crate::error::AppError;

/// Data access for accounts and their todos.
///
/// Every todo operation is scoped by `owner`. A todo that exists but belongs
/// to another account is reported exactly like a missing one (`None` or
/// `false`), so callers cannot probe for other users' rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Repository: Send + Sync {
    /// Fails with `DatabaseError::Duplicate` when the username or email is taken.
    async fn create_account(&self, account: NewAccount) -> Result<Account, AppError>;

    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>, AppError>;

    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError>;

    async fn set_account_role(&self, id: Uuid, role: Role) -> Result<Option<Account>, AppError>;

    async fn list_todos(&self, owner: Uuid, page: Page) -> Result<Vec<Todo>, AppError>;

    async fn create_todo(&self, owner: Uuid, todo: NewTodo) -> Result<Todo, AppError>;

    async fn find_todo(&self, owner: Uuid, id: Uuid) -> Result<Option<Todo>, AppError>;

    async fn update_todo(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: TodoChanges,
    ) -> Result<Option<Todo>, AppError>;

    async fn complete_todo(&self, owner: Uuid, id: Uuid) -> Result<Option<Todo>, AppError>;

    /// Returns whether a row was deleted.
    async fn delete_todo(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError>;
}
