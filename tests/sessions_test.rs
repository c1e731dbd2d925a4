// ABOUTME: Integration tests for session registration, login, and logout
// ABOUTME: Covers the user cap, token rotation, and non-leaking credential errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use blockfit_server::errors::ErrorCode;
use blockfit_server::models::CredentialsPayload;

use common::create_test_resources;

fn credentials(login: &str, password: &str) -> CredentialsPayload {
    CredentialsPayload {
        login: login.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_register_issues_verifiable_token() {
    let harness = create_test_resources().await.unwrap();
    let sessions = &harness.resources.sessions;

    let response = sessions
        .register(credentials("coach", "s3cret-pass"))
        .await
        .unwrap();

    let session = sessions.verify(&response.token.to_string()).await.unwrap();
    assert_eq!(session.id, response.token);
}

#[tokio::test]
async fn test_register_rejects_empty_credentials() {
    let harness = create_test_resources().await.unwrap();
    let sessions = &harness.resources.sessions;

    let err = sessions
        .register(credentials("", "password"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let err = sessions
        .register(credentials("coach", ""))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn test_register_rejects_duplicate_login() {
    let harness = create_test_resources().await.unwrap();
    let sessions = &harness.resources.sessions;

    sessions
        .register(credentials("coach", "first-pass"))
        .await
        .unwrap();
    let err = sessions
        .register(credentials("coach", "second-pass"))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn test_register_caps_the_user_count() {
    let harness = create_test_resources().await.unwrap();
    let sessions = &harness.resources.sessions;

    sessions
        .register(credentials("first", "password-one"))
        .await
        .unwrap();
    sessions
        .register(credentials("second", "password-two"))
        .await
        .unwrap();

    let err = sessions
        .register(credentials("third", "password-three"))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidState);
}

#[tokio::test]
async fn test_login_rotates_the_session_token() {
    let harness = create_test_resources().await.unwrap();
    let sessions = &harness.resources.sessions;

    let first = sessions
        .register(credentials("coach", "s3cret-pass"))
        .await
        .unwrap();
    let second = sessions
        .login(credentials("coach", "s3cret-pass"))
        .await
        .unwrap();
    assert_ne!(first.token, second.token);

    // The rotated-out token no longer verifies
    let err = sessions
        .verify(&first.token.to_string())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthInvalid);

    sessions.verify(&second.token.to_string()).await.unwrap();
}

#[tokio::test]
async fn test_login_failures_do_not_reveal_which_part_was_wrong() {
    let harness = create_test_resources().await.unwrap();
    let sessions = &harness.resources.sessions;

    sessions
        .register(credentials("coach", "s3cret-pass"))
        .await
        .unwrap();

    let wrong_password = sessions
        .login(credentials("coach", "wrong"))
        .await
        .unwrap_err();
    let unknown_login = sessions
        .login(credentials("nobody", "s3cret-pass"))
        .await
        .unwrap_err();

    assert_eq!(wrong_password.code, ErrorCode::AuthInvalid);
    assert_eq!(unknown_login.code, ErrorCode::AuthInvalid);
    assert_eq!(wrong_password.message, unknown_login.message);
}

#[tokio::test]
async fn test_logout_invalidates_the_token() {
    let harness = create_test_resources().await.unwrap();
    let sessions = &harness.resources.sessions;

    let response = sessions
        .register(credentials("coach", "s3cret-pass"))
        .await
        .unwrap();
    let token = response.token.to_string();

    sessions.logout(&token).await.unwrap();

    let err = sessions.verify(&token).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthInvalid);
}

#[tokio::test]
async fn test_logout_with_unknown_token_is_not_found() {
    let harness = create_test_resources().await.unwrap();

    let err = harness
        .resources
        .sessions
        .logout("not-a-real-token")
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_two_users_hold_independent_sessions() {
    let harness = create_test_resources().await.unwrap();
    let sessions = &harness.resources.sessions;

    let first = sessions
        .register(credentials("alice", "password-one"))
        .await
        .unwrap();
    let second = sessions
        .register(credentials("bob", "password-two"))
        .await
        .unwrap();

    let first_session = sessions.verify(&first.token.to_string()).await.unwrap();
    let second_session = sessions.verify(&second.token.to_string()).await.unwrap();
    assert_ne!(first_session.user_id, second_session.user_id);

    // One user logging out leaves the other session intact
    sessions.logout(&first.token.to_string()).await.unwrap();
    sessions.verify(&second.token.to_string()).await.unwrap();
}
