//! Category list and create pages against the fake backend.

mod common;

use common::Backend;
use rental_admin::pages::categories::{CREATE_FAILED, NO_CATEGORIES};
use rental_admin::pages::{BrandsPage, CategoryListPage, CategoryNewPage};
use rental_admin::{ErrorCode, Navigator, Route};
use rental_core::{DialogState, FormPhase, NotificationKind};

#[tokio::test]
async fn test_empty_list_shows_empty_state() {
    let backend = Backend::start().await;
    let (app, _) = common::mount_signed_in(&backend).await;

    let mut page = CategoryListPage::new(app.context());
    page.load().await.unwrap();
    assert!(page.rows().is_empty());
    assert_eq!(page.empty_message(), Some(NO_CATEGORIES));
    app.unmount().await.unwrap();
}

#[tokio::test]
async fn test_create_root_category() {
    let backend = Backend::start().await;
    let (app, nav) = common::mount_signed_in(&backend).await;
    app.open("/products/categories/new").unwrap();

    let mut page = CategoryNewPage::new(app.context());
    page.load().await.unwrap();
    assert!(page.parent_options().is_empty());

    page.set_name("Electronics").unwrap();
    let preview = page.preview();
    assert_eq!(preview.path, "Electronics");
    assert_eq!(preview.level, 0);

    let created = page.submit().await.unwrap();
    assert_eq!(created.category_path, "Electronics");
    assert_eq!(created.category_level, 0);
    assert!(created.is_leaf);
    assert!(created.parent_category_id.is_none());

    assert_eq!(nav.current(), Some(Route::Categories));
    let toast = app.app().notifications().into_iter().next().unwrap();
    assert_eq!(toast.kind, NotificationKind::Success);
    assert_eq!(toast.title, "Category Created");
    app.unmount().await.unwrap();
}

#[tokio::test]
async fn test_create_child_flips_parent_leaf() {
    let backend = Backend::start().await;
    let electronics = backend.seed_category("Electronics", None);
    let parent_id = electronics["id"].as_str().unwrap().to_string();
    let (app, _) = common::mount_signed_in(&backend).await;

    let mut page = CategoryNewPage::new(app.context());
    page.load().await.unwrap();
    let options = page.parent_options();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].label, "Electronics");
    assert!(options[0].is_leaf);

    page.set_name("Cameras").unwrap();
    page.select_parent(Some(&parent_id)).unwrap();
    let preview = page.preview();
    assert_eq!(preview.path, "Electronics/Cameras");
    assert_eq!(preview.level, 1);
    assert!(preview.parent_becomes_branch);

    let created = page.submit().await.unwrap();
    assert_eq!(created.category_path, "Electronics/Cameras");
    assert_eq!(created.category_level, 1);
    assert!(created.is_leaf);
    assert_eq!(created.parent_category_id.as_deref(), Some(parent_id.as_str()));

    // Both the local picker and the server agree the parent is now a branch.
    let local_parent = page
        .known_categories()
        .iter()
        .find(|c| c.id == parent_id)
        .unwrap();
    assert!(!local_parent.is_leaf);
    let server_parent = backend
        .categories()
        .into_iter()
        .find(|c| c["id"] == parent_id.as_str())
        .unwrap();
    assert_eq!(server_parent["is_leaf"], false);
    app.unmount().await.unwrap();
}

#[tokio::test]
async fn test_unknown_parent_rejected_locally() {
    let backend = Backend::start().await;
    let (app, _) = common::mount_signed_in(&backend).await;

    let mut page = CategoryNewPage::new(app.context());
    page.load().await.unwrap();
    let err = page.select_parent(Some("cat-9999")).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(page.form().draft().parent_id, None);
    app.unmount().await.unwrap();
}

#[tokio::test]
async fn test_blank_name_is_invalid_without_request() {
    let backend = Backend::start().await;
    let (app, nav) = common::mount_signed_in(&backend).await;
    app.open("/products/categories/new").unwrap();

    let mut page = CategoryNewPage::new(app.context());
    page.load().await.unwrap();
    page.set_name("   ").unwrap();
    let err = page.submit().await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(page.form().phase(), FormPhase::Invalid);
    assert_eq!(page.form().errors().first("name"), Some("Category name is required"));
    assert!(backend.categories().is_empty());
    assert_eq!(nav.current(), Some(Route::CategoryNew));
    app.unmount().await.unwrap();
}

#[tokio::test]
async fn test_server_failure_keeps_draft_and_route() {
    let backend = Backend::start().await;
    let (app, nav) = common::mount_signed_in(&backend).await;
    app.open("/products/categories/new").unwrap();

    let mut page = CategoryNewPage::new(app.context());
    page.load().await.unwrap();
    page.set_name("Lighting").unwrap();

    backend.fail_next_write();
    let err = page.submit().await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ServerError);
    assert_eq!(page.form().phase(), FormPhase::Failed);
    assert_eq!(page.form().server_error(), Some(CREATE_FAILED));
    assert_eq!(page.form().draft().name, "Lighting");
    assert_eq!(nav.current(), Some(Route::CategoryNew));

    let toast = app.app().notifications().into_iter().next().unwrap();
    assert_eq!(toast.kind, NotificationKind::Error);
    assert_eq!(toast.message.as_deref(), Some(CREATE_FAILED));

    // The kept draft can be resubmitted as-is.
    let created = page.submit().await.unwrap();
    assert_eq!(created.category_name, "Lighting");
    assert_eq!(nav.current(), Some(Route::Categories));
    app.unmount().await.unwrap();
}

#[tokio::test]
async fn test_duplicate_name_shows_server_message() {
    let backend = Backend::start().await;
    backend.seed_category("Cameras", None);
    let (app, _) = common::mount_signed_in(&backend).await;

    let mut page = CategoryNewPage::new(app.context());
    page.load().await.unwrap();
    page.set_name("Cameras").unwrap();
    let err = page.submit().await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ValidationError);
    assert_eq!(
        page.form().server_error(),
        Some("Category with name 'Cameras' already exists")
    );
    app.unmount().await.unwrap();
}

#[tokio::test]
async fn test_create_invalidates_cached_list() {
    let backend = Backend::start().await;
    backend.seed_category("Audio", None);
    let (app, _) = common::mount_signed_in_caching(&backend, 60).await;

    let mut list = CategoryListPage::new(app.context());
    list.load().await.unwrap();
    assert_eq!(list.rows().len(), 1);
    let calls = backend.category_list_calls();

    // Fresh cache entry: no second request.
    list.load().await.unwrap();
    assert_eq!(backend.category_list_calls(), calls);

    let mut page = CategoryNewPage::new(app.context());
    page.load().await.unwrap();
    page.set_name("Video").unwrap();
    page.submit().await.unwrap();

    let before_reload = backend.category_list_calls();
    list.load().await.unwrap();
    assert_eq!(backend.category_list_calls(), before_reload + 1);
    let paths: Vec<String> = list.rows().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["Audio".to_string(), "Video".to_string()]);
    app.unmount().await.unwrap();
}

#[tokio::test]
async fn test_search_and_delete() {
    let backend = Backend::start().await;
    backend.seed_category("Drones", None);
    backend.seed_category("Tripods", None);
    let (app, _) = common::mount_signed_in(&backend).await;

    let mut list = CategoryListPage::new(app.context());
    list.search("dro").await.unwrap();
    let rows = list.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Drones");

    let id = rows[0].id.clone();
    list.confirm_delete(&id).unwrap();
    assert!(matches!(list.dialog(), DialogState::ConfirmDelete(c) if c.id == id));
    list.delete_confirmed().await.unwrap();

    assert!(!list.dialog().is_open());
    assert_eq!(list.empty_message(), Some(NO_CATEGORIES));
    assert_eq!(backend.categories().len(), 1);
    app.unmount().await.unwrap();
}

#[tokio::test]
async fn test_expired_session_redirects_to_login() {
    let backend = Backend::start().await;
    let (app, _) = common::mount(&backend).await;

    // No token: the server answers 401 and the list shows the failure.
    let mut list = CategoryListPage::new(app.context());
    let err = list.load().await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Unauthorized);
    assert!(list.state().error().is_some());
    assert_eq!(
        app.open("/products/categories").unwrap(),
        Route::login_redirecting_to(&Route::Categories)
    );
    app.unmount().await.unwrap();
}

#[tokio::test]
async fn test_brand_create_through_dialog() {
    let backend = Backend::start().await;
    let (app, _) = common::mount_signed_in(&backend).await;

    let mut page = BrandsPage::new(app.context());
    page.load().await.unwrap();
    assert_eq!(page.empty_message(), Some("No brands found"));

    page.open_create().unwrap();
    {
        let draft = page.edit().unwrap();
        draft.brand_name = "Canon".into();
        draft.brand_code = Some("can".into());
    }
    let brand = page.submit().await.unwrap();
    assert_eq!(brand.brand_code.as_deref(), Some("CAN"));
    assert!(!page.editor().is_open());
    assert_eq!(page.listing().items().len(), 1);

    // Same code again: dialog stays open with the server's message.
    page.open_create().unwrap();
    {
        let draft = page.edit().unwrap();
        draft.brand_name = "Canon Duplicate".into();
        draft.brand_code = Some("CAN".into());
    }
    let err = page.submit().await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert!(page.editor().is_open());
    assert_eq!(
        page.editor().form().unwrap().server_error(),
        Some("Brand with code 'CAN' already exists")
    );
    app.unmount().await.unwrap();
}
