#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use crate::database::entity::{group, post};
    use crate::database::postgres_repo::{PostgresGroupRepository, PostgresPostRepository};
    use yatube_core::domain::Post;
    use yatube_core::ports::{BaseRepository, GroupRepository};

    #[tokio::test]
    async fn test_find_post_by_id() {
        let post_id = Uuid::new_v4();
        let author_id = Uuid::new_v4();
        let now = chrono::Utc::now();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post::Model {
                id: post_id,
                author_id,
                text: "Test-post".to_owned(),
                group_id: None,
                pub_date: now.into(),
            }]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

        assert!(result.is_some());
        let found = result.unwrap();
        assert_eq!(found.text, "Test-post");
        assert_eq!(found.author_id, author_id);
    }

    #[tokio::test]
    async fn test_find_post_by_id_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<post::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(Uuid::new_v4()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_find_group_by_slug() {
        let group_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![group::Model {
                id: group_id,
                title: "Test-group".to_owned(),
                slug: "test-slug".to_owned(),
                description: "Test-description".to_owned(),
            }]])
            .into_connection();

        let repo = PostgresGroupRepository::new(db);

        let result = repo.find_by_slug("test-slug").await.unwrap();
        assert_eq!(result.unwrap().title, "Test-group");
    }

    #[tokio::test]
    async fn test_insert_post_returns_row() {
        let created = Post::new(Uuid::new_v4(), "Test-text".to_owned(), None);
        let model = post::Model {
            id: created.id,
            author_id: created.author_id,
            text: created.text.clone(),
            group_id: None,
            pub_date: created.pub_date.into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let saved = repo.insert(created.clone()).await.unwrap();
        assert_eq!(saved.id, created.id);
        assert_eq!(saved.text, "Test-text");
    }
}
