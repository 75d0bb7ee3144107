#![cfg(feature = "sqlite")]

use hatim_planner::{AuthError, AuthProvider, SqliteAuthProvider};
use tempfile::NamedTempFile;

#[test]
fn sign_up_then_sign_in() {
    let auth = SqliteAuthProvider::in_memory().unwrap();
    let registered = auth.sign_up("Leader@Example.com", "secret1").unwrap();
    assert_eq!(registered.email, "leader@example.com");
    // registration does not start a session
    assert_eq!(auth.current_user(), None);

    let user = auth.sign_in("leader@example.com", "secret1").unwrap();
    assert_eq!(user, registered);
    assert_eq!(auth.current_user(), Some(user));

    auth.sign_out().unwrap();
    assert_eq!(auth.current_user(), None);
    // signing out twice is fine
    auth.sign_out().unwrap();
}

#[test]
fn rejects_bad_input_and_wrong_passwords() {
    let auth = SqliteAuthProvider::in_memory().unwrap();
    assert!(matches!(
        auth.sign_up("not-an-email", "secret1"),
        Err(AuthError::InvalidEmail(_))
    ));
    assert!(matches!(
        auth.sign_up("a@example.com", "123"),
        Err(AuthError::WeakPassword { min: 6 })
    ));

    auth.sign_up("a@example.com", "secret1").unwrap();
    assert!(matches!(
        auth.sign_up("A@example.com", "another1"),
        Err(AuthError::EmailTaken(_))
    ));
    assert!(matches!(
        auth.sign_in("a@example.com", "wrong-password"),
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        auth.sign_in("nobody@example.com", "secret1"),
        Err(AuthError::InvalidCredentials)
    ));
    assert_eq!(auth.current_user(), None);
}

#[test]
fn accounts_persist_in_the_database_file() {
    let file = NamedTempFile::new().unwrap();
    let id = {
        let auth = SqliteAuthProvider::new(file.path()).unwrap();
        auth.sign_up("b@example.com", "secret1").unwrap().id
    };

    let auth = SqliteAuthProvider::new(file.path()).unwrap();
    let user = auth.sign_in("b@example.com", "secret1").unwrap();
    assert_eq!(user.id, id);
}
