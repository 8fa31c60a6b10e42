use std::env;

use anyhow::Result;

use super::Credentials;
use crate::domain::models::AuthContext;
use crate::domain::models::UserProfile;

fn temp_store() -> Credentials {
    let dir = env::temp_dir().join(format!("kantuta-credentials-{}", uuid::Uuid::new_v4()));
    return Credentials::new(dir);
}

#[tokio::test]
async fn it_round_trips_credentials() -> Result<()> {
    let store = temp_store();

    let auth = AuthContext::authenticated(
        "jwt-abc".to_string(),
        UserProfile {
            nombre: "María".to_string(),
            email: "maria@estudio.bo".to_string(),
            rol_nombre: Some("experta".to_string()),
            actions: vec!["chat".to_string()],
        },
    );

    store.save(&auth).await?;
    let loaded = store.load().await?;

    assert_eq!(loaded, auth);
    assert!(loaded.is_authenticated());

    store.clear().await?;
    let cleared = store.load().await?;
    assert!(!cleared.is_authenticated());
    assert_eq!(cleared.user, None);

    return Ok(());
}

#[tokio::test]
async fn it_loads_logged_out_state_when_no_file_exists() -> Result<()> {
    let store = temp_store();
    let auth = store.load().await?;

    assert!(!auth.is_authenticated());

    return Ok(());
}

#[tokio::test]
async fn it_clears_without_a_file() -> Result<()> {
    let store = temp_store();
    let res = store.clear().await;

    assert!(res.is_ok());

    return Ok(());
}
