#[cfg(test)]
#[path = "credentials_test.rs"]
mod tests;

use std::path;

use anyhow::Result;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::models::AuthContext;

/// Stores the access token and user profile between runs, under the cache
/// dir. Populated by `login`, removed by `logout`.
pub struct Credentials {
    pub cache_dir: path::PathBuf,
}

impl Default for Credentials {
    fn default() -> Credentials {
        let cache_dir = dirs::cache_dir().unwrap().join("kantuta");

        return Credentials::new(cache_dir);
    }
}

impl Credentials {
    pub fn new(cache_dir: path::PathBuf) -> Credentials {
        return Credentials { cache_dir };
    }

    fn get_file_path(&self) -> path::PathBuf {
        return self.cache_dir.join("credentials.yaml");
    }

    /// A missing file is the logged-out state, not an error.
    pub async fn load(&self) -> Result<AuthContext> {
        let file_path = self.get_file_path();
        if !file_path.exists() {
            return Ok(AuthContext::default());
        }

        let payload = fs::read_to_string(file_path).await?;
        let auth: AuthContext = serde_yaml::from_str(&payload)?;

        return Ok(auth);
    }

    pub async fn save(&self, auth: &AuthContext) -> Result<()> {
        let payload = serde_yaml::to_string(auth)?;

        if !self.cache_dir.exists() {
            fs::create_dir_all(&self.cache_dir).await?;
        }

        let mut file = fs::File::create(self.get_file_path()).await?;
        file.write_all(payload.as_bytes()).await?;

        return Ok(());
    }

    pub async fn clear(&self) -> Result<()> {
        let file_path = self.get_file_path();
        if !file_path.exists() {
            return Ok(());
        }

        fs::remove_file(file_path).await?;
        return Ok(());
    }
}
