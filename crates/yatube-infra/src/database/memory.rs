//! In-memory repository implementations.
//!
//! Used when no `DATABASE_URL` is configured, and as the backing store for
//! handler-level tests. Data is lost on process restart.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use yatube_core::domain::{Group, Page, Post, User, POSTS_PER_PAGE};
use yatube_core::error::RepoError;
use yatube_core::ports::{
    BaseRepository, GroupRepository, PostFilter, PostRepository, UserRepository,
};

/// In-memory user store.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if store
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        store.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        let slot = store
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(RepoError::NotFound)?;
        *slot = user.clone();
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|u| u.id != id);
        if store.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.iter().find(|u| u.email == email).cloned())
    }
}

/// In-memory group store.
#[derive(Default)]
pub struct InMemoryGroupRepository {
    store: RwLock<Vec<Group>>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Group, Uuid> for InMemoryGroupRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, RepoError> {
        let store = self.store.read().await;
        Ok(store.iter().find(|g| g.id == id).cloned())
    }

    async fn insert(&self, group: Group) -> Result<Group, RepoError> {
        let mut store = self.store.write().await;
        if store.iter().any(|g| g.slug == group.slug) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        store.push(group.clone());
        Ok(group)
    }

    async fn update(&self, group: Group) -> Result<Group, RepoError> {
        let mut store = self.store.write().await;
        let slot = store
            .iter_mut()
            .find(|g| g.id == group.id)
            .ok_or(RepoError::NotFound)?;
        *slot = group.clone();
        Ok(group)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|g| g.id != id);
        if store.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let store = self.store.read().await;
        Ok(store.iter().find(|g| g.slug == slug).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Group>, RepoError> {
        let store = self.store.read().await;
        Ok(store.clone())
    }
}

/// In-memory post store. Insertion order doubles as recency order since
/// pub_date is fixed at creation.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<Vec<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        store.push(post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        let slot = store
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(RepoError::NotFound)?;
        *slot = post.clone();
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|p| p.id != id);
        if store.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn page(&self, filter: PostFilter, number: u64) -> Result<Page<Post>, RepoError> {
        let store = self.store.read().await;
        let matched: Vec<Post> = store
            .iter()
            .rev()
            .filter(|p| match filter {
                PostFilter::All => true,
                PostFilter::Group(group_id) => p.group_id == Some(group_id),
                PostFilter::Author(author_id) => p.author_id == author_id,
            })
            .cloned()
            .collect();

        Ok(Page::slice(matched, number, POSTS_PER_PAGE))
    }

    async fn count(&self) -> Result<u64, RepoError> {
        let store = self.store.read().await;
        Ok(store.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(username: &str) -> User {
        User::new(
            username.to_string(),
            format!("{username}@example.com"),
            "hash".to_string(),
        )
    }

    #[tokio::test]
    async fn test_insert_increments_count() {
        let posts = InMemoryPostRepository::new();
        let author = Uuid::new_v4();

        assert_eq!(posts.count().await.unwrap(), 0);
        posts
            .insert(Post::new(author, "Test-text".to_string(), None))
            .await
            .unwrap();
        assert_eq!(posts.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_count_and_author() {
        let posts = InMemoryPostRepository::new();
        let author = Uuid::new_v4();
        let group = Uuid::new_v4();

        let post = posts
            .insert(Post::new(author, "Test-text".to_string(), None))
            .await
            .unwrap();

        let edited = posts
            .update(post.clone().edited("Edited".to_string(), Some(group)))
            .await
            .unwrap();

        assert_eq!(posts.count().await.unwrap(), 1);
        assert_eq!(edited.author_id, author);
        assert_eq!(edited.pub_date, post.pub_date);
        assert_eq!(edited.text, "Edited");
        assert_eq!(edited.group_id, Some(group));
    }

    #[tokio::test]
    async fn test_update_missing_post_is_not_found() {
        let posts = InMemoryPostRepository::new();
        let ghost = Post::new(Uuid::new_v4(), "nope".to_string(), None);

        assert!(matches!(
            posts.update(ghost).await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_thirteen_posts_paginate_ten_then_three() {
        let posts = InMemoryPostRepository::new();
        let author = Uuid::new_v4();
        let group = Uuid::new_v4();

        for i in 0..13 {
            posts
                .insert(Post::new(author, format!("Test-text {i}"), Some(group)))
                .await
                .unwrap();
        }

        for filter in [
            PostFilter::All,
            PostFilter::Group(group),
            PostFilter::Author(author),
        ] {
            let first = posts.page(filter, 1).await.unwrap();
            assert_eq!(first.object_list.len(), 10);
            assert_eq!(first.total_pages, 2);
            assert_eq!(first.count, 13);

            let second = posts.page(filter, 2).await.unwrap();
            assert_eq!(second.object_list.len(), 3);
        }
    }

    #[tokio::test]
    async fn test_newest_post_listed_first() {
        let posts = InMemoryPostRepository::new();
        let author = Uuid::new_v4();

        posts
            .insert(Post::new(author, "older".to_string(), None))
            .await
            .unwrap();
        let newest = posts
            .insert(Post::new(author, "newest".to_string(), None))
            .await
            .unwrap();

        let page = posts.page(PostFilter::All, 1).await.unwrap();
        assert_eq!(page.object_list[0].id, newest.id);
    }

    #[tokio::test]
    async fn test_group_filter_excludes_other_posts() {
        let posts = InMemoryPostRepository::new();
        let author = Uuid::new_v4();
        let group = Uuid::new_v4();

        posts
            .insert(Post::new(author, "grouped".to_string(), Some(group)))
            .await
            .unwrap();
        posts
            .insert(Post::new(author, "ungrouped".to_string(), None))
            .await
            .unwrap();

        let page = posts.page(PostFilter::Group(group), 1).await.unwrap();
        assert_eq!(page.object_list.len(), 1);
        assert_eq!(page.object_list[0].text, "grouped");
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let users = InMemoryUserRepository::new();
        users.insert(sample_user("HasNoName")).await.unwrap();

        let result = users.insert(sample_user("HasNoName")).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_find_group_by_slug() {
        let groups = InMemoryGroupRepository::new();
        let group = Group::new(
            "Test-group".to_string(),
            "test-slug".to_string(),
            "Test-description".to_string(),
        );
        groups.insert(group.clone()).await.unwrap();

        let found = groups.find_by_slug("test-slug").await.unwrap().unwrap();
        assert_eq!(found.id, group.id);
        assert!(groups.find_by_slug("missing").await.unwrap().is_none());
    }
}
