#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use axum_extra::extract::cookie::Key;
use http_body_util::BodyExt;
use serde_json::Value;
use time::OffsetDateTime;
use time::macros::datetime;
use tower::ServiceExt;
use uuid::Uuid;

use gazette::application::admin::posts::AdminPostService;
use gazette::application::posts::PostQueryService;
use gazette::application::repos::{
    AdminPostFilter, CreatePostParams, ListWindow, PostsRepo, PostsWriteRepo,
    PublishedPostFilter, RepoError, UpdatePostParams,
};
use gazette::cache::{CacheConfig, PostCache};
use gazette::config::StoreFailurePolicy;
use gazette::domain::entities::{PostRecord, PostSummaryRecord};
use gazette::infra::http::{self, ApiRateLimiter, HttpState, SessionConfig};
use gazette::monitor::PerformanceMonitor;

pub const ADMIN_EMAIL: &str = "editor@example.com";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

/// Post store kept in memory, counting every read and optionally failing.
#[derive(Default)]
pub struct InMemoryPosts {
    posts: Mutex<HashMap<Uuid, PostRecord>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    failing: AtomicBool,
}

impl InMemoryPosts {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, post: PostRecord) {
        self.posts.lock().unwrap().insert(post.id, post);
    }

    pub fn len(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn get(&self, id: Uuid) -> Option<PostRecord> {
        self.posts.lock().unwrap().get(&id).cloned()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn begin_read(&self) -> Result<(), RepoError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::from_persistence("connection refused"));
        }
        Ok(())
    }

    fn begin_write(&self) -> Result<(), RepoError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::from_persistence("connection refused"));
        }
        Ok(())
    }

    fn published(&self, filter: &PublishedPostFilter, window: ListWindow) -> Vec<PostRecord> {
        let mut posts: Vec<PostRecord> = self
            .posts
            .lock()
            .unwrap()
            .values()
            .filter(|post| post.published)
            .filter(|post| !filter.featured_only || post.featured)
            .filter(|post| {
                filter
                    .category
                    .as_ref()
                    .is_none_or(|category| post.category.as_ref() == Some(category))
            })
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));

        let posts = posts.into_iter().skip(window.offset as usize);
        match window.limit {
            Some(limit) => posts.take(limit as usize).collect(),
            None => posts.collect(),
        }
    }
}

#[async_trait]
impl PostsRepo for InMemoryPosts {
    async fn list_published(
        &self,
        filter: &PublishedPostFilter,
        window: ListWindow,
    ) -> Result<Vec<PostSummaryRecord>, RepoError> {
        self.begin_read()?;
        Ok(self
            .published(filter, window)
            .iter()
            .map(PostSummaryRecord::from)
            .collect())
    }

    async fn list_published_with_content(
        &self,
        filter: &PublishedPostFilter,
        window: ListWindow,
    ) -> Result<Vec<PostRecord>, RepoError> {
        self.begin_read()?;
        Ok(self.published(filter, window))
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        self.begin_read()?;
        Ok(self
            .posts
            .lock()
            .unwrap()
            .values()
            .find(|post| post.slug == slug && post.published)
            .cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        self.begin_read()?;
        Ok(self
            .posts
            .lock()
            .unwrap()
            .values()
            .find(|post| post.slug == slug)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        self.begin_read()?;
        Ok(self.get(id))
    }

    async fn list_for_admin(&self, filter: &AdminPostFilter) -> Result<Vec<PostRecord>, RepoError> {
        self.begin_read()?;
        let search = filter.search.as_ref().map(|term| term.to_lowercase());
        let mut posts: Vec<PostRecord> = self
            .posts
            .lock()
            .unwrap()
            .values()
            .filter(|post| filter.published.is_none_or(|published| post.published == published))
            .filter(|post| {
                filter
                    .category
                    .as_ref()
                    .is_none_or(|category| post.category.as_ref() == Some(category))
            })
            .filter(|post| {
                search.as_ref().is_none_or(|term| {
                    post.title.to_lowercase().contains(term)
                        || post.description.to_lowercase().contains(term)
                })
            })
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn ping(&self) -> Result<(), RepoError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::from_persistence("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl PostsWriteRepo for InMemoryPosts {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        self.begin_write()?;
        let mut posts = self.posts.lock().unwrap();
        if posts.values().any(|post| post.slug == params.slug) {
            return Err(RepoError::Duplicate {
                constraint: "posts_slug_key".into(),
            });
        }
        let now = OffsetDateTime::now_utc();
        let record = PostRecord {
            id: Uuid::new_v4(),
            slug: params.slug,
            title: params.title,
            description: params.description,
            content: params.content,
            author: params.author,
            category: params.category,
            tags: params.tags,
            featured: params.featured,
            published: params.published,
            zodiac_sign: params.zodiac_sign,
            difficulty: params.difficulty,
            humor_level: params.humor_level,
            target_audience: params.target_audience,
            reading_time: params.reading_time,
            cover_image: params.cover_image,
            pub_date: params.pub_date,
            created_at: now,
            updated_at: now,
        };
        posts.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        self.begin_write()?;
        let mut posts = self.posts.lock().unwrap();
        if posts
            .values()
            .any(|post| post.slug == params.slug && post.id != params.id)
        {
            return Err(RepoError::Duplicate {
                constraint: "posts_slug_key".into(),
            });
        }
        let record = posts.get_mut(&params.id).ok_or(RepoError::NotFound)?;
        record.slug = params.slug;
        record.title = params.title;
        record.description = params.description;
        record.content = params.content;
        record.author = params.author;
        record.category = params.category;
        record.tags = params.tags;
        record.featured = params.featured;
        record.published = params.published;
        record.zodiac_sign = params.zodiac_sign;
        record.difficulty = params.difficulty;
        record.humor_level = params.humor_level;
        record.target_audience = params.target_audience;
        record.reading_time = params.reading_time;
        record.cover_image = params.cover_image;
        record.pub_date = params.pub_date;
        record.updated_at = OffsetDateTime::now_utc();
        Ok(record.clone())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        self.begin_write()?;
        self.posts
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

/// A published post with every optional field empty.
pub fn post(slug: &str, title: &str) -> PostRecord {
    let stamp = datetime!(2025-01-01 00:00 UTC);
    PostRecord {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        title: title.to_string(),
        description: format!("About {title}"),
        content: format!("# {title}\n\nBody of {slug}."),
        author: "Gazette Editorial".to_string(),
        category: None,
        tags: Vec::new(),
        featured: false,
        published: true,
        zodiac_sign: None,
        difficulty: None,
        humor_level: None,
        target_audience: None,
        reading_time: None,
        cover_image: None,
        pub_date: stamp,
        created_at: stamp,
        updated_at: stamp,
    }
}

/// Services wired over one in-memory store, the way `main` wires them.
pub struct TestApp {
    pub store: Arc<InMemoryPosts>,
    pub cache: Arc<PostCache>,
    pub monitor: Arc<PerformanceMonitor>,
    pub posts: Arc<PostQueryService>,
    pub admin_posts: Arc<AdminPostService>,
    pub rate_limiter: Arc<ApiRateLimiter>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_policy(StoreFailurePolicy::Degrade)
    }

    pub fn with_policy(policy: StoreFailurePolicy) -> Self {
        Self::build(policy, 1_000)
    }

    pub fn with_rate_limit(max_requests: u32) -> Self {
        Self::build(StoreFailurePolicy::Degrade, max_requests)
    }

    fn build(policy: StoreFailurePolicy, max_requests: u32) -> Self {
        let store = InMemoryPosts::new();
        let cache = Arc::new(PostCache::new());
        let monitor = Arc::new(PerformanceMonitor::default());
        let posts = Arc::new(PostQueryService::new(
            store.clone(),
            cache.clone(),
            monitor.clone(),
            CacheConfig::default(),
            policy,
        ));
        let admin_posts = Arc::new(AdminPostService::new(
            store.clone(),
            store.clone(),
            cache.clone(),
        ));
        let rate_limiter = Arc::new(ApiRateLimiter::new(Duration::from_secs(60), max_requests));

        Self {
            store,
            cache,
            monitor,
            posts,
            admin_posts,
            rate_limiter,
        }
    }

    pub fn router(&self) -> Router {
        http::build_router(HttpState {
            posts: self.posts.clone(),
            admin_posts: self.admin_posts.clone(),
            store: self.store.clone(),
            cache: self.cache.clone(),
            monitor: self.monitor.clone(),
            sessions: Arc::new(SessionConfig::new(
                ADMIN_EMAIL,
                Some(ADMIN_PASSWORD.to_string()),
                false,
                Duration::from_secs(7 * 24 * 60 * 60),
            )),
            session_key: Key::generate(),
            rate_limiter: self.rate_limiter.clone(),
        })
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.expect("router responds")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn with_cookie(method: &str, uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

/// Sign in as the configured admin and return the `Cookie` header value.
pub async fn login(router: &Router) -> String {
    let response = send(
        router,
        json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), 200, "login should succeed");

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap();
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}
