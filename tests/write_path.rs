mod support;

use gazette::application::admin::posts::{AdminPostError, CreatePostCommand, UpdatePostCommand};
use gazette::application::posts::AllPostsOptions;
use gazette::cache::keys;
use uuid::Uuid;

use support::{TestApp, post};

fn command(slug: &str, title: &str) -> CreatePostCommand {
    CreatePostCommand {
        slug: slug.to_string(),
        title: title.to_string(),
        description: "Uma descrição".to_string(),
        content: "Corpo do texto".to_string(),
        published: true,
        ..CreatePostCommand::default()
    }
}

#[tokio::test]
async fn create_with_existing_slug_conflicts_and_leaves_store_untouched() {
    let app = TestApp::new();
    let existing = post("taken", "Original");
    app.store.insert(existing.clone());

    let err = app
        .admin_posts
        .create_post(command("taken", "Impostor"))
        .await
        .unwrap_err();

    assert!(matches!(err, AdminPostError::Conflict { ref slug } if slug == "taken"));
    assert_eq!(app.store.len(), 1);
    assert_eq!(app.store.writes(), 0);
    assert_eq!(app.store.get(existing.id), Some(existing));
}

#[tokio::test]
async fn create_applies_defaults() {
    let app = TestApp::new();

    let created = app
        .admin_posts
        .create_post(CreatePostCommand {
            slug: "  rascunho  ".into(),
            title: " Rascunho ".into(),
            description: "d".into(),
            content: "c".into(),
            tags: vec![" lua ".into(), "lua".into(), "".into()],
            ..CreatePostCommand::default()
        })
        .await
        .unwrap();

    assert_eq!(created.slug, "rascunho");
    assert_eq!(created.title, "Rascunho");
    assert!(!created.published);
    assert!(!created.featured);
    assert_eq!(created.author, "Gazette Editorial");
    assert_eq!(created.tags, vec!["lua".to_string()]);
}

#[tokio::test]
async fn create_rejects_invalid_input_before_touching_the_store() {
    let app = TestApp::new();

    let cases = [
        (command("", "T"), "slug"),
        (command("Not A Slug", "T"), "slug"),
        (command("ok", "   "), "title"),
        (
            CreatePostCommand {
                reading_time: Some(0),
                ..command("ok", "T")
            },
            "reading_time",
        ),
    ];
    for (command, expected_field) in cases {
        let err = app.admin_posts.create_post(command).await.unwrap_err();
        assert!(
            matches!(err, AdminPostError::Validation { field, .. } if field == expected_field),
            "expected validation on {expected_field}, got {err:?}"
        );
    }
    assert_eq!(app.store.reads(), 0);
    assert_eq!(app.store.writes(), 0);
}

#[tokio::test]
async fn updating_a_cached_post_is_visible_on_next_read() {
    let app = TestApp::new();
    let original = post("a", "Old");
    app.store.insert(original.clone());

    let cached = app.posts.post_by_slug("a").await.unwrap().unwrap();
    assert_eq!(cached.title, "Old");

    app.admin_posts
        .update_post(UpdatePostCommand {
            id: original.id,
            title: Some("New".into()),
            ..UpdatePostCommand::default()
        })
        .await
        .unwrap();

    let fresh = app.posts.post_by_slug("a").await.unwrap().unwrap();
    assert_eq!(fresh.title, "New");
}

#[tokio::test]
async fn update_merges_only_supplied_fields() {
    let app = TestApp::new();
    let mut original = post("a", "Title");
    original.category = Some("tarot".into());
    original.reading_time = Some(4);
    app.store.insert(original.clone());

    let updated = app
        .admin_posts
        .update_post(UpdatePostCommand {
            id: original.id,
            featured: Some(true),
            cover_image: Some("  https://cdn.example.com/a.png ".into()),
            ..UpdatePostCommand::default()
        })
        .await
        .unwrap();

    assert!(updated.featured);
    assert_eq!(updated.title, "Title");
    assert_eq!(updated.category.as_deref(), Some("tarot"));
    assert_eq!(updated.reading_time, Some(4));
    assert_eq!(
        updated.cover_image.as_deref(),
        Some("https://cdn.example.com/a.png")
    );
    assert!(updated.updated_at > original.updated_at);
}

#[tokio::test]
async fn slug_change_invalidates_both_slugs_and_lists() {
    let app = TestApp::new();
    let original = post("before", "Post");
    app.store.insert(original.clone());

    app.posts.post_by_slug("before").await.unwrap();
    app.posts.all_posts(AllPostsOptions::default()).await.unwrap();
    assert_eq!(app.cache.stats().size, 2);

    let updated = app
        .admin_posts
        .update_post(UpdatePostCommand {
            id: original.id,
            slug: Some("after".into()),
            ..UpdatePostCommand::default()
        })
        .await
        .unwrap();
    assert_eq!(updated.slug, "after");

    assert!(!app.cache.has(&keys::post_by_slug("before")));
    assert!(!app.cache.has(&keys::published_posts(true, None, 0)));
    assert!(app.posts.post_by_slug("before").await.unwrap().is_none());
    assert!(app.posts.post_by_slug("after").await.unwrap().is_some());
}

#[tokio::test]
async fn update_conflicts_on_taken_slug() {
    let app = TestApp::new();
    let first = post("first", "First");
    app.store.insert(first.clone());
    app.store.insert(post("second", "Second"));

    let err = app
        .admin_posts
        .update_post(UpdatePostCommand {
            id: first.id,
            slug: Some("second".into()),
            ..UpdatePostCommand::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AdminPostError::Conflict { .. }));
    assert_eq!(app.store.writes(), 0);
}

#[tokio::test]
async fn update_and_delete_unknown_ids_are_not_found() {
    let app = TestApp::new();

    let update = app
        .admin_posts
        .update_post(UpdatePostCommand {
            id: Uuid::new_v4(),
            title: Some("x".into()),
            ..UpdatePostCommand::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(update, AdminPostError::NotFound));

    let delete = app.admin_posts.delete_post(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(delete, AdminPostError::NotFound));
}

#[tokio::test]
async fn delete_evicts_cached_post_and_lists() {
    let app = TestApp::new();
    let doomed = post("doomed", "Doomed");
    app.store.insert(doomed.clone());

    app.posts.post_by_slug("doomed").await.unwrap();
    app.posts.featured_posts(None).await.unwrap();

    app.admin_posts.delete_post(doomed.id).await.unwrap();

    assert_eq!(app.cache.stats().size, 0);
    assert!(app.posts.post_by_slug("doomed").await.unwrap().is_none());
}

#[tokio::test]
async fn writes_leave_unrelated_single_posts_cached() {
    let app = TestApp::new();
    app.store.insert(post("keep", "Keep"));

    app.posts.post_by_slug("keep").await.unwrap();
    app.admin_posts.create_post(command("fresh", "Fresh")).await.unwrap();

    assert!(app.cache.has(&keys::post_by_slug("keep")));
}

#[tokio::test]
async fn admin_listing_includes_drafts_and_filters() {
    let app = TestApp::new();
    let mut draft = post("draft", "Lua Nova");
    draft.published = false;
    app.store.insert(draft);
    app.store.insert(post("live", "Sol em Leão"));

    let all = app.admin_posts.list(&Default::default()).await.unwrap();
    assert_eq!(all.len(), 2);

    let drafts = app
        .admin_posts
        .list(&gazette::application::repos::AdminPostFilter {
            published: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].slug, "draft");

    let search = app
        .admin_posts
        .list(&gazette::application::repos::AdminPostFilter {
            search: Some("LEÃO".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(search.len(), 1);
    assert_eq!(search[0].slug, "live");
}
