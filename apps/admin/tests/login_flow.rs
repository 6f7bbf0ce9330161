//! Sign-in, redirect-after-login and session persistence against the fake
//! backend.

mod common;

use std::sync::Arc;

use common::{Backend, DEMO_EMAIL, DEMO_PASSWORD};
use rental_admin::pages::login::LOGIN_FAILED;
use rental_admin::pages::LoginPage;
use rental_admin::{ErrorCode, Navigator, Route};
use rental_client::FileStorage;
use rental_core::{FormPhase, NotificationKind};

#[tokio::test]
async fn test_anonymous_user_is_sent_to_login_with_redirect() {
    let backend = Backend::start().await;
    let (app, nav) = common::mount(&backend).await;

    let landed = app.open("/products/categories/new").unwrap();
    assert_eq!(
        landed,
        Route::Login {
            redirect: Some("/products/categories/new".into())
        }
    );
    assert_eq!(
        nav.current().map(|r| r.path()),
        Some("/login?redirect=%2Fproducts%2Fcategories%2Fnew".to_string())
    );
    app.unmount().await.unwrap();
}

#[tokio::test]
async fn test_login_returns_to_requested_page() {
    let backend = Backend::start().await;
    let (app, nav) = common::mount(&backend).await;

    let landed = app.open("/products/categories/new").unwrap();
    let mut page = LoginPage::for_route(app.context(), &landed);
    page.fill(DEMO_EMAIL, DEMO_PASSWORD).unwrap();

    let route = page.submit().await.unwrap();
    assert_eq!(route, Route::CategoryNew);
    assert_eq!(nav.current(), Some(Route::CategoryNew));

    let state = app.auth().state();
    assert!(state.is_authenticated);
    assert_eq!(state.access_token.as_deref(), Some(common::ACCESS_TOKEN));
    assert_eq!(state.user.map(|u| u.display_name()).as_deref(), Some("Demo Admin"));

    let toast = app.app().notifications().into_iter().next().unwrap();
    assert_eq!(toast.kind, NotificationKind::Success);
    assert_eq!(toast.title, "Login Successful");
    assert_eq!(toast.message.as_deref(), Some("Welcome back, Demo Admin!"));
    app.unmount().await.unwrap();
}

#[tokio::test]
async fn test_login_without_redirect_lands_on_dashboard() {
    let backend = Backend::start().await;
    let (app, nav) = common::mount_signed_in(&backend).await;
    assert_eq!(nav.current(), Some(Route::Dashboard));

    // Signed-in users visiting /login bounce to the dashboard.
    assert_eq!(app.open("/login").unwrap(), Route::Dashboard);
    app.unmount().await.unwrap();
}

#[tokio::test]
async fn test_wrong_password_keeps_form_and_route() {
    let backend = Backend::start().await;
    let (app, nav) = common::mount(&backend).await;
    let landed = app.open("/dashboard").unwrap();

    let mut page = LoginPage::for_route(app.context(), &landed);
    page.fill(DEMO_EMAIL, "wrong-password").unwrap();
    let err = page.submit().await.unwrap_err();

    assert_eq!(err.code, ErrorCode::Unauthorized);
    assert_eq!(page.form().phase(), FormPhase::Failed);
    assert_eq!(page.form().server_error(), Some("Incorrect email or password"));
    assert_eq!(page.form().draft().email, DEMO_EMAIL);
    assert!(!app.auth().is_authenticated());
    assert_eq!(nav.current(), Some(landed));

    let toast = app.app().notifications().into_iter().next().unwrap();
    assert_eq!(toast.kind, NotificationKind::Error);
    assert_eq!(toast.title, "Login Failed");
    app.unmount().await.unwrap();
}

#[tokio::test]
async fn test_invalid_email_never_reaches_server() {
    let backend = Backend::start().await;
    let (app, _) = common::mount(&backend).await;

    let mut page = LoginPage::new(app.context(), None);
    page.fill("not-an-email", DEMO_PASSWORD).unwrap();
    let err = page.submit().await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(page.form().phase(), FormPhase::Invalid);
    assert!(page.form().errors().contains("email"));
    assert!(app.app().notifications().is_empty());
    app.unmount().await.unwrap();
}

#[tokio::test]
async fn test_session_survives_restart() {
    let backend = Backend::start().await;
    let dir = tempfile::tempdir().unwrap();

    let storage = Arc::new(FileStorage::new(dir.path().to_path_buf()));
    let (app, _) = common::mount_with(&backend, storage).await;
    let mut page = LoginPage::new(app.context(), None);
    page.fill(DEMO_EMAIL, DEMO_PASSWORD).unwrap();
    page.submit().await.unwrap();
    app.unmount().await.unwrap();

    let storage = Arc::new(FileStorage::new(dir.path().to_path_buf()));
    let (app, _) = common::mount_with(&backend, storage).await;
    assert!(app.auth().is_authenticated());
    assert_eq!(
        app.auth().state().access_token.as_deref(),
        Some(common::ACCESS_TOKEN)
    );
    assert_eq!(app.open("/products/categories").unwrap(), Route::Categories);
    app.unmount().await.unwrap();
}

#[tokio::test]
async fn test_logout_clears_session() {
    let backend = Backend::start().await;
    let (app, nav) = common::mount_signed_in(&backend).await;

    app.logout().await.unwrap();
    assert!(!app.auth().is_authenticated());
    assert_eq!(nav.current(), Some(Route::Login { redirect: None }));
    assert_eq!(
        app.open("/products/brands").unwrap(),
        Route::login_redirecting_to(&Route::Brands)
    );
    app.unmount().await.unwrap();
}

#[tokio::test]
async fn test_store_failure_after_login_leaves_form_editable() {
    let backend = Backend::start().await;
    let (app, nav) = common::mount(&backend).await;
    let landed = app.open("/dashboard").unwrap();
    app.auth().shutdown().await.unwrap();

    let mut page = LoginPage::for_route(app.context(), &landed);
    page.fill(DEMO_EMAIL, DEMO_PASSWORD).unwrap();
    let err = page.submit().await.unwrap_err();

    assert_eq!(err.code, ErrorCode::StoreError);
    assert_eq!(page.form().phase(), FormPhase::Failed);
    assert_eq!(page.form().server_error(), Some(LOGIN_FAILED));
    assert_eq!(nav.current(), Some(landed));

    let toast = app.app().notifications().into_iter().next().unwrap();
    assert_eq!(toast.kind, NotificationKind::Error);
    assert_eq!(toast.title, "Login Failed");

    // The banner does not lock the form: the user can retype and retry.
    page.edit().unwrap().password = "another".into();
    assert_eq!(page.form().phase(), FormPhase::Editing);
}
