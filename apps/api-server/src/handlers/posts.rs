//! Post handlers: listings, detail, create and edit.
//!
//! Listing handlers expose a `page_obj` context, detail exposes `post`,
//! and the create/edit form handlers expose `form`, matching the page
//! contexts of the original application.

use std::collections::HashMap;

use actix_web::{HttpResponse, http::header, web};
use serde::Deserialize;
use uuid::Uuid;

use yatube_core::domain::{Page, Post};
use yatube_core::ports::PostFilter;
use yatube_shared::dto::{
    FieldError, GroupChoice, PageObj, PostDetailContext, PostForm, PostFormContext, PostFormData,
    PostItem, PostListContext,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// `?page=N` query, 1-based. Missing or zero means the first page.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    page: Option<u64>,
}

impl PageQuery {
    fn number(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }
}

/// Resolve author usernames and group titles for a batch of posts.
async fn hydrate_posts(state: &AppState, posts: Vec<Post>) -> Result<Vec<PostItem>, AppError> {
    let mut usernames: HashMap<Uuid, String> = HashMap::new();
    let mut group_titles: HashMap<Uuid, String> = HashMap::new();
    let mut items = Vec::with_capacity(posts.len());

    for post in posts {
        if !usernames.contains_key(&post.author_id) {
            let author = state
                .users
                .find_by_id(post.author_id)
                .await?
                .ok_or_else(|| {
                    AppError::Internal(format!("post {} references missing author", post.id))
                })?;
            usernames.insert(post.author_id, author.username);
        }

        if let Some(group_id) = post.group_id {
            if !group_titles.contains_key(&group_id) {
                let group = state.groups.find_by_id(group_id).await?.ok_or_else(|| {
                    AppError::Internal(format!("post {} references missing group", post.id))
                })?;
                group_titles.insert(group_id, group.title);
            }
        }

        items.push(PostItem {
            id: post.id,
            text: post.text,
            author_username: usernames[&post.author_id].clone(),
            group_title: post.group_id.map(|id| group_titles[&id].clone()),
            pub_date: post.pub_date,
        });
    }

    Ok(items)
}

async fn page_context(state: &AppState, page: Page<Post>) -> Result<PostListContext, AppError> {
    let Page {
        object_list,
        number,
        total_pages,
        count,
    } = page;

    Ok(PostListContext {
        page_obj: PageObj {
            object_list: hydrate_posts(state, object_list).await?,
            number,
            total_pages,
            count,
        },
    })
}

async fn group_choices(state: &AppState) -> Result<Vec<GroupChoice>, AppError> {
    Ok(state
        .groups
        .list_all()
        .await?
        .into_iter()
        .map(|g| GroupChoice {
            id: g.id,
            title: g.title,
            slug: g.slug,
        })
        .collect())
}

/// Field-level validation of submitted form data.
async fn validate_form(state: &AppState, data: &PostFormData) -> Result<Vec<FieldError>, AppError> {
    let mut errors = Vec::new();

    if data.text.trim().is_empty() {
        errors.push(FieldError {
            field: "text".to_string(),
            message: "This field is required.".to_string(),
        });
    }

    if let Some(group_id) = data.group {
        if state.groups.find_by_id(group_id).await?.is_none() {
            errors.push(FieldError {
                field: "group".to_string(),
                message: "Select a valid group.".to_string(),
            });
        }
    }

    Ok(errors)
}

async fn bound_form(
    state: &AppState,
    data: &PostFormData,
    errors: Vec<FieldError>,
) -> Result<PostForm, AppError> {
    Ok(PostForm {
        text: data.text.clone(),
        group: data.group,
        choices: group_choices(state).await?,
        errors,
    })
}

/// GET /api/posts
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state.posts.page(PostFilter::All, query.number()).await?;
    let context = page_context(&state, page).await?;

    Ok(HttpResponse::Ok().json(context))
}

/// GET /api/groups/{slug}
pub async fn group_list(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let group = state
        .groups
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Group '{}' not found", slug)))?;

    let page = state
        .posts
        .page(PostFilter::Group(group.id), query.number())
        .await?;
    let context = page_context(&state, page).await?;

    Ok(HttpResponse::Ok().json(context))
}

/// GET /api/profile/{username}
pub async fn profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", username)))?;

    let page = state
        .posts
        .page(PostFilter::Author(user.id), query.number())
        .await?;
    let context = page_context(&state, page).await?;

    Ok(HttpResponse::Ok().json(context))
}

/// GET /api/posts/{post_id}
pub async fn post_detail(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post_id)))?;

    let mut items = hydrate_posts(&state, vec![post]).await?;
    let post = items.pop().ok_or_else(|| {
        AppError::Internal("post vanished during hydration".to_string())
    })?;

    Ok(HttpResponse::Ok().json(PostDetailContext { post }))
}

/// GET /api/posts/create - unbound form with group choices.
pub async fn post_create_form(
    state: web::Data<AppState>,
    _identity: Identity,
) -> AppResult<HttpResponse> {
    let form = PostForm {
        text: String::new(),
        group: None,
        choices: group_choices(&state).await?,
        errors: Vec::new(),
    };

    Ok(HttpResponse::Ok().json(PostFormContext { form }))
}

/// POST /api/posts/create
///
/// The author is always the session user; submitted author fields are
/// dropped during deserialization. Redirects to the author's profile.
pub async fn post_create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostFormData>,
) -> AppResult<HttpResponse> {
    let data = body.into_inner();

    let errors = validate_form(&state, &data).await?;
    if !errors.is_empty() {
        let form = bound_form(&state, &data, errors).await?;
        return Ok(HttpResponse::UnprocessableEntity().json(PostFormContext { form }));
    }

    let post = Post::new(identity.user_id, data.text, data.group);
    let saved = state.posts.insert(post).await?;

    tracing::info!(post_id = %saved.id, author = %identity.username, "Created post");

    Ok(HttpResponse::Found()
        .insert_header((
            header::LOCATION,
            format!("/api/profile/{}", identity.username),
        ))
        .finish())
}

/// GET /api/posts/{post_id}/edit - form pre-populated with current values.
pub async fn post_edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post_id)))?;

    if post.author_id != identity.user_id {
        return Err(AppError::Forbidden);
    }

    let form = PostForm {
        text: post.text,
        group: post.group_id,
        choices: group_choices(&state).await?,
        errors: Vec::new(),
    };

    Ok(HttpResponse::Ok().json(PostFormContext { form }))
}

/// POST /api/posts/{post_id}/edit
///
/// Author-only. Updates text and group in place, keeps author and
/// pub_date, then redirects to the post detail route.
pub async fn post_edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostFormData>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let data = body.into_inner();

    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post_id)))?;

    if post.author_id != identity.user_id {
        return Err(AppError::Forbidden);
    }

    let errors = validate_form(&state, &data).await?;
    if !errors.is_empty() {
        let form = bound_form(&state, &data, errors).await?;
        return Ok(HttpResponse::UnprocessableEntity().json(PostFormContext { form }));
    }

    let updated = state
        .posts
        .update(post.edited(data.text, data.group))
        .await?;

    tracing::info!(post_id = %updated.id, author = %identity.username, "Edited post");

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, format!("/api/posts/{}", updated.id)))
        .finish())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use serde_json::json;

    use yatube_core::domain::{Group, Post, User};
    use yatube_core::ports::TokenService;
    use yatube_infra::{JwtConfig, JwtTokenService};
    use yatube_shared::dto::{PostFormContext, PostListContext};

    use super::*;

    fn test_token_service() -> Arc<dyn TokenService> {
        Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret-key".to_string(),
            expiration_hours: 1,
            issuer: "test-issuer".to_string(),
        }))
    }

    struct TestApp {
        state: AppState,
        tokens: Arc<dyn TokenService>,
    }

    impl TestApp {
        fn new() -> Self {
            Self {
                state: AppState::in_memory(),
                tokens: test_token_service(),
            }
        }

        async fn seed_user(&self, username: &str) -> (User, String) {
            let user = self
                .state
                .users
                .insert(User::new(
                    username.to_string(),
                    format!("{username}@example.com"),
                    "hash".to_string(),
                ))
                .await
                .unwrap();
            let token = self.tokens.generate_token(user.id, &user.username).unwrap();
            (user, token)
        }

        async fn seed_group(&self, title: &str, slug: &str) -> Group {
            self.state
                .groups
                .insert(Group::new(
                    title.to_string(),
                    slug.to_string(),
                    "Test-description".to_string(),
                ))
                .await
                .unwrap()
        }

        async fn seed_post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
            self.state
                .posts
                .insert(Post::new(
                    author.id,
                    text.to_string(),
                    group.map(|g| g.id),
                ))
                .await
                .unwrap()
        }
    }

    macro_rules! init_app {
        ($app:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($app.state.clone()))
                    .app_data(web::Data::new($app.tokens.clone()))
                    .configure(crate::handlers::configure_routes),
            )
            .await
        };
    }

    fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {token}"))
    }

    #[actix_web::test]
    async fn test_create_post_redirects_to_profile_and_adds_one() {
        let app = TestApp::new();
        let (user, token) = app.seed_user("HasNoName").await;
        let group = app.seed_group("Test-group", "test-slug").await;
        let service = init_app!(&app);

        let before = app.state.posts.count().await.unwrap();

        let req = test::TestRequest::post()
            .uri("/api/posts/create")
            .insert_header(bearer(&token))
            .set_json(json!({ "text": "Test-text", "group": group.id }))
            .to_request();
        let resp = test::call_service(&service, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/api/profile/HasNoName"
        );
        assert_eq!(app.state.posts.count().await.unwrap(), before + 1);

        let page = app.state.posts.page(PostFilter::All, 1).await.unwrap();
        let created = &page.object_list[0];
        assert_eq!(created.text, "Test-text");
        assert_eq!(created.group_id, Some(group.id));
        assert_eq!(created.author_id, user.id);
    }

    #[actix_web::test]
    async fn test_create_post_ignores_submitted_author() {
        let app = TestApp::new();
        let (user, token) = app.seed_user("HasNoName").await;
        let (other, _) = app.seed_user("Test-User").await;
        let service = init_app!(&app);

        let req = test::TestRequest::post()
            .uri("/api/posts/create")
            .insert_header(bearer(&token))
            .set_json(json!({ "text": "Test-text", "author": other.id }))
            .to_request();
        let resp = test::call_service(&service, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        let page = app.state.posts.page(PostFilter::All, 1).await.unwrap();
        assert_eq!(page.object_list[0].author_id, user.id);
    }

    #[actix_web::test]
    async fn test_create_post_unauthenticated_is_rejected() {
        let app = TestApp::new();
        let service = init_app!(&app);

        let req = test::TestRequest::post()
            .uri("/api/posts/create")
            .set_json(json!({ "text": "Test-text" }))
            .to_request();
        let resp = test::call_service(&service, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(app.state.posts.count().await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn test_create_post_empty_text_returns_form_errors() {
        let app = TestApp::new();
        let (_, token) = app.seed_user("HasNoName").await;
        let service = init_app!(&app);

        let req = test::TestRequest::post()
            .uri("/api/posts/create")
            .insert_header(bearer(&token))
            .set_json(json!({ "text": "   " }))
            .to_request();
        let resp = test::call_service(&service, req).await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let context: PostFormContext = test::read_body_json(resp).await;
        assert_eq!(context.form.errors.len(), 1);
        assert_eq!(context.form.errors[0].field, "text");
        assert_eq!(app.state.posts.count().await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn test_create_post_unknown_group_returns_form_errors() {
        let app = TestApp::new();
        let (_, token) = app.seed_user("HasNoName").await;
        let service = init_app!(&app);

        let req = test::TestRequest::post()
            .uri("/api/posts/create")
            .insert_header(bearer(&token))
            .set_json(json!({ "text": "Test-text", "group": Uuid::new_v4() }))
            .to_request();
        let resp = test::call_service(&service, req).await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let context: PostFormContext = test::read_body_json(resp).await;
        assert_eq!(context.form.errors[0].field, "group");
        assert_eq!(app.state.posts.count().await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn test_create_form_lists_group_choices() {
        let app = TestApp::new();
        let (_, token) = app.seed_user("HasNoName").await;
        app.seed_group("Test-group", "test-slug").await;
        let service = init_app!(&app);

        let req = test::TestRequest::get()
            .uri("/api/posts/create")
            .insert_header(bearer(&token))
            .to_request();
        let resp = test::call_service(&service, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let context: PostFormContext = test::read_body_json(resp).await;
        assert!(context.form.text.is_empty());
        assert_eq!(context.form.choices.len(), 1);
        assert_eq!(context.form.choices[0].slug, "test-slug");
    }

    #[actix_web::test]
    async fn test_edit_post_updates_text_and_group_keeps_author() {
        let app = TestApp::new();
        let (user, token) = app.seed_user("HasNoName").await;
        let group = app.seed_group("Test-group", "test-slug").await;
        let other_group = app.seed_group("Test-group-2", "test-slug-2").await;
        let post = app.seed_post(&user, "Test-text", Some(&group)).await;
        let service = init_app!(&app);

        let before = app.state.posts.count().await.unwrap();

        let req = test::TestRequest::post()
            .uri(&format!("/api/posts/{}/edit", post.id))
            .insert_header(bearer(&token))
            .set_json(json!({ "text": "Edited-text", "group": other_group.id }))
            .to_request();
        let resp = test::call_service(&service, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            format!("/api/posts/{}", post.id).as_str()
        );
        assert_eq!(app.state.posts.count().await.unwrap(), before);

        let edited = app
            .state
            .posts
            .find_by_id(post.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(edited.author_id, user.id);
        assert_eq!(edited.pub_date, post.pub_date);
        assert_eq!(edited.text, "Edited-text");
        assert_eq!(edited.group_id, Some(other_group.id));
    }

    #[actix_web::test]
    async fn test_edit_post_by_non_author_is_forbidden() {
        let app = TestApp::new();
        let (author, _) = app.seed_user("HasNoName").await;
        let (_, intruder_token) = app.seed_user("Test-User").await;
        let post = app.seed_post(&author, "Test-text", None).await;
        let service = init_app!(&app);

        let req = test::TestRequest::post()
            .uri(&format!("/api/posts/{}/edit", post.id))
            .insert_header(bearer(&intruder_token))
            .set_json(json!({ "text": "Hijacked" }))
            .to_request();
        let resp = test::call_service(&service, req).await;

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let unchanged = app
            .state
            .posts
            .find_by_id(post.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.text, "Test-text");
    }

    #[actix_web::test]
    async fn test_edit_form_is_prepopulated() {
        let app = TestApp::new();
        let (user, token) = app.seed_user("HasNoName").await;
        let group = app.seed_group("Test-group", "test-slug").await;
        let post = app.seed_post(&user, "Test-text", Some(&group)).await;
        let service = init_app!(&app);

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{}/edit", post.id))
            .insert_header(bearer(&token))
            .to_request();
        let resp = test::call_service(&service, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let context: PostFormContext = test::read_body_json(resp).await;
        assert_eq!(context.form.text, "Test-text");
        assert_eq!(context.form.group, Some(group.id));
    }

    #[actix_web::test]
    async fn test_listings_paginate_thirteen_posts() {
        let app = TestApp::new();
        let (user, _) = app.seed_user("HasNoName").await;
        let group = app.seed_group("Test-group", "test-slug").await;
        for i in 0..13 {
            app.seed_post(&user, &format!("Test-text {i}"), Some(&group))
                .await;
        }
        let service = init_app!(&app);

        for uri in [
            "/api/posts",
            "/api/groups/test-slug",
            "/api/profile/HasNoName",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&service, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let context: PostListContext = test::read_body_json(resp).await;
            assert_eq!(context.page_obj.object_list.len(), 10);
            assert_eq!(context.page_obj.total_pages, 2);
            assert_eq!(context.page_obj.count, 13);

            let req = test::TestRequest::get()
                .uri(&format!("{uri}?page=2"))
                .to_request();
            let resp = test::call_service(&service, req).await;
            let context: PostListContext = test::read_body_json(resp).await;
            assert_eq!(context.page_obj.object_list.len(), 3);
            assert_eq!(context.page_obj.number, 2);
        }
    }

    #[actix_web::test]
    async fn test_listing_items_expose_author_and_group() {
        let app = TestApp::new();
        let (user, _) = app.seed_user("HasNoName").await;
        let group = app.seed_group("Test-group", "test-slug").await;
        app.seed_post(&user, "Test-post", Some(&group)).await;
        let service = init_app!(&app);

        let req = test::TestRequest::get().uri("/api/posts").to_request();
        let resp = test::call_service(&service, req).await;
        let context: PostListContext = test::read_body_json(resp).await;

        let item = &context.page_obj.object_list[0];
        assert_eq!(item.text, "Test-post");
        assert_eq!(item.author_username, "HasNoName");
        assert_eq!(item.group_title.as_deref(), Some("Test-group"));
    }

    #[actix_web::test]
    async fn test_new_post_appears_in_all_listings() {
        let app = TestApp::new();
        let (_, token) = app.seed_user("Test-User").await;
        let group = app.seed_group("Test-group", "test-slug").await;
        let service = init_app!(&app);

        let req = test::TestRequest::post()
            .uri("/api/posts/create")
            .insert_header(bearer(&token))
            .set_json(json!({ "text": "Test-text", "group": group.id }))
            .to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);

        let created_id = app.state.posts.page(PostFilter::All, 1).await.unwrap().object_list[0].id;

        for uri in [
            "/api/posts",
            "/api/groups/test-slug",
            "/api/profile/Test-User",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&service, req).await;
            let context: PostListContext = test::read_body_json(resp).await;
            assert!(
                context
                    .page_obj
                    .object_list
                    .iter()
                    .any(|p| p.id == created_id),
                "post missing from {uri}"
            );
        }
    }

    #[actix_web::test]
    async fn test_post_detail_context() {
        let app = TestApp::new();
        let (user, _) = app.seed_user("HasNoName").await;
        let group = app.seed_group("Test-group", "test-slug").await;
        let post = app.seed_post(&user, "Test-post", Some(&group)).await;
        let service = init_app!(&app);

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{}", post.id))
            .to_request();
        let resp = test::call_service(&service, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let context: PostDetailContext = test::read_body_json(resp).await;
        assert_eq!(context.post.text, "Test-post");
        assert_eq!(context.post.author_username, "HasNoName");
        assert_eq!(context.post.group_title.as_deref(), Some("Test-group"));
    }

    #[actix_web::test]
    async fn test_post_detail_missing_returns_not_found() {
        let app = TestApp::new();
        let service = init_app!(&app);

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{}", Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&service, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_group_list_unknown_slug_returns_not_found() {
        let app = TestApp::new();
        let service = init_app!(&app);

        let req = test::TestRequest::get()
            .uri("/api/groups/no-such-slug")
            .to_request();
        let resp = test::call_service(&service, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_profile_unknown_username_returns_not_found() {
        let app = TestApp::new();
        let service = init_app!(&app);

        let req = test::TestRequest::get()
            .uri("/api/profile/nobody")
            .to_request();
        let resp = test::call_service(&service, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
