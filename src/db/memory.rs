use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::models::{Account, NewAccount, NewTodo, Page, Role, Todo, TodoChanges};
use crate::db::repository::Repository;
use crate::error::{AppError, DatabaseError};

#[derive(Debug, Default)]
struct Tables {
    accounts: HashMap<Uuid, Account>,
    // Insertion order doubles as creation order for listing.
    todos: Vec<Todo>,
}

impl Tables {
    fn owned_todo_mut(&mut self, owner: Uuid, id: Uuid) -> Option<&mut Todo> {
        self.todos
            .iter_mut()
            .find(|t| t.id == id && t.owner_id == owner)
    }
}

/// Process-local repository. Backs the test suite and `database.backend = "memory"`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create_account(&self, account: NewAccount) -> Result<Account, AppError> {
        let mut tables = self.tables.write().await;

        if tables.accounts.values().any(|a| a.username == account.username) {
            return Err(DatabaseError::Duplicate("Username".into()).into());
        }
        if tables.accounts.values().any(|a| a.email == account.email) {
            return Err(DatabaseError::Duplicate("Email".into()).into());
        }

        let account = Account::new(account);
        tables.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .accounts
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        Ok(self.tables.read().await.accounts.get(&id).cloned())
    }

    async fn set_account_role(&self, id: Uuid, role: Role) -> Result<Option<Account>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.accounts.get_mut(&id).map(|account| {
            account.role = role;
            account.clone()
        }))
    }

    async fn list_todos(&self, owner: Uuid, page: Page) -> Result<Vec<Todo>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .todos
            .iter()
            .filter(|t| t.owner_id == owner)
            .skip(page.skip as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn create_todo(&self, owner: Uuid, todo: NewTodo) -> Result<Todo, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.accounts.contains_key(&owner) {
            return Err(DatabaseError::QueryError(format!("owner {} does not exist", owner)).into());
        }
        let todo = Todo::new(owner, todo);
        tables.todos.push(todo.clone());
        Ok(todo)
    }

    async fn find_todo(&self, owner: Uuid, id: Uuid) -> Result<Option<Todo>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .todos
            .iter()
            .find(|t| t.id == id && t.owner_id == owner)
            .cloned())
    }

    async fn update_todo(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: TodoChanges,
    ) -> Result<Option<Todo>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.owned_todo_mut(owner, id).map(|todo| {
            todo.apply(&changes);
            todo.clone()
        }))
    }

    async fn complete_todo(&self, owner: Uuid, id: Uuid) -> Result<Option<Todo>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.owned_todo_mut(owner, id).map(|todo| {
            todo.completed = true;
            todo.clone()
        }))
    }

    async fn delete_todo(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.todos.len();
        tables.todos.retain(|t| !(t.id == id && t.owner_id == owner));
        Ok(tables.todos.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(name: &str) -> NewAccount {
        NewAccount {
            username: name.to_string(),
            email: format!("{}@x.com", name),
            password_hash: "hash".to_string(),
            role: Role::User,
        }
    }

    fn new_todo(title: &str) -> NewTodo {
        NewTodo {
            title: title.to_string(),
            description: String::new(),
            due_date: None,
        }
    }

    #[tokio::test]
    async fn test_username_and_email_are_unique() {
        let repo = InMemoryRepository::new();
        repo.create_account(new_account("alice")).await.unwrap();

        let err = repo.create_account(new_account("alice")).await.unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(DatabaseError::Duplicate(ref w)) if w == "Username"));

        let mut other = new_account("alice2");
        other.email = "alice@x.com".into();
        let err = repo.create_account(other).await.unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(DatabaseError::Duplicate(ref w)) if w == "Email"));
    }

    #[tokio::test]
    async fn test_todos_are_scoped_to_owner() {
        let repo = InMemoryRepository::new();
        let alice = repo.create_account(new_account("alice")).await.unwrap();
        let bob = repo.create_account(new_account("bob")).await.unwrap();

        let todo = repo.create_todo(alice.id, new_todo("Buy milk")).await.unwrap();

        assert!(repo.find_todo(bob.id, todo.id).await.unwrap().is_none());
        assert!(repo.complete_todo(bob.id, todo.id).await.unwrap().is_none());
        assert!(repo
            .update_todo(bob.id, todo.id, TodoChanges { title: Some("x".into()), ..Default::default() })
            .await
            .unwrap()
            .is_none());
        assert!(!repo.delete_todo(bob.id, todo.id).await.unwrap());
        assert!(repo.list_todos(bob.id, Page::default()).await.unwrap().is_empty());

        assert_eq!(repo.find_todo(alice.id, todo.id).await.unwrap(), Some(todo.clone()));
        assert!(repo.delete_todo(alice.id, todo.id).await.unwrap());
        assert!(repo.find_todo(alice.id, todo.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_pagination_preserves_creation_order() {
        let repo = InMemoryRepository::new();
        let alice = repo.create_account(new_account("alice")).await.unwrap();
        for i in 0..5 {
            repo.create_todo(alice.id, new_todo(&format!("todo {}", i))).await.unwrap();
        }

        let page = repo.list_todos(alice.id, Page::new(Some(1), Some(2))).await.unwrap();
        let titles: Vec<_> = page.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["todo 1", "todo 2"]);
    }

    #[tokio::test]
    async fn test_todo_requires_existing_owner() {
        let repo = InMemoryRepository::new();
        assert!(repo.create_todo(Uuid::new_v4(), new_todo("orphan")).await.is_err());
    }
}
