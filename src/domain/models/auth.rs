use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub nombre: String,
    pub email: String,
    #[serde(default)]
    pub rol_nombre: Option<String>,
    #[serde(default)]
    pub actions: Vec<String>,
}

/// Explicit authentication state handed to the networking layer. Populated at
/// login, cleared at logout; an empty context issues unauthenticated
/// requests.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthContext {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

impl AuthContext {
    pub fn authenticated(token: String, user: UserProfile) -> AuthContext {
        return AuthContext {
            token: Some(token),
            user: Some(user),
        };
    }

    pub fn is_authenticated(&self) -> bool {
        return self.token.is_some();
    }
}
