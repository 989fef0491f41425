//! Session module (encrypted file-based session storage)
//!
//! Stores the Plaza session encrypted with AES-256-GCM in ~/.config/parlor/session.enc
//! The encryption key is derived from machine-specific identifiers.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use crate::paths;

const NONCE_SIZE: usize = 12;

/// An authenticated Plaza session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Access token sent with every API request
    pub token: String,
    /// Numeric id of the authenticated user
    pub user_id: i64,
    /// Username of the authenticated user
    pub username: String,
}

impl Session {
    /// Whether the session owns the profile with the given username
    pub fn is_owner(&self, username: &str) -> bool {
        self.username == username
    }
}

/// Get machine ID for key derivation (cross-platform)
fn get_machine_id() -> String {
    // Linux: /etc/machine-id or /var/lib/dbus/machine-id
    #[cfg(target_os = "linux")]
    {
        if let Ok(id) = fs::read_to_string("/etc/machine-id") {
            return id.trim().to_string();
        }
        if let Ok(id) = fs::read_to_string("/var/lib/dbus/machine-id") {
            return id.trim().to_string();
        }
    }

    // macOS: IOPlatformUUID via ioreg
    #[cfg(target_os = "macos")]
    {
        if let Ok(output) = std::process::Command::new("ioreg")
            .args(["-rd1", "-c", "IOPlatformExpertDevice"])
            .output()
        {
            let stdout = String::from_utf8_lossy(&output.stdout);
            for line in stdout.lines() {
                if line.contains("IOPlatformUUID") {
                    if let Some(uuid) = line.split('"').nth(3) {
                        return uuid.to_string();
                    }
                }
            }
        }
    }

    // Windows: MachineGuid from registry
    #[cfg(target_os = "windows")]
    {
        if let Ok(output) = std::process::Command::new("reg")
            .args([
                "query",
                r"HKLM\SOFTWARE\Microsoft\Cryptography",
                "/v",
                "MachineGuid",
            ])
            .output()
        {
            let stdout = String::from_utf8_lossy(&output.stdout);
            for line in stdout.lines() {
                if line.contains("MachineGuid") {
                    if let Some(guid) = line.split_whitespace().last() {
                        return guid.to_string();
                    }
                }
            }
        }
    }

    // Fallback: use home directory path (always available via dirs crate)
    dirs::home_dir()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "parlor-fallback-key".to_string())
}

/// Derive encryption key from machine-specific data
fn derive_key() -> [u8; 32] {
    let mut hasher = Sha256::new();

    // Primary: machine-specific ID
    hasher.update(get_machine_id().as_bytes());

    // Secondary: home directory path (cross-platform via dirs crate)
    if let Some(home) = dirs::home_dir() {
        hasher.update(home.to_string_lossy().as_bytes());
    }

    // Tertiary: data directory path
    if let Some(data) = dirs::data_dir() {
        hasher.update(data.to_string_lossy().as_bytes());
    }

    // Fixed salt for this app
    hasher.update(b"parlor-plaza-client-v1");

    hasher.finalize().into()
}

/// Load the session from the default encrypted file
pub fn load() -> Result<Option<Session>> {
    load_from(&paths::session_path()?)
}

/// Load the session from a specific path
pub fn load_from(path: &Path) -> Result<Option<Session>> {
    if !path.exists() {
        return Ok(None);
    }

    let encrypted = fs::read(path).context("Failed to read session file")?;

    if encrypted.len() < NONCE_SIZE {
        return Ok(None);
    }

    let (nonce_bytes, ciphertext) = encrypted.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce_bytes);

    let key = derive_key();
    let cipher = Aes256Gcm::new_from_slice(&key).expect("Invalid key length");

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| anyhow::anyhow!("Failed to decrypt session"))?;

    let json = String::from_utf8(plaintext).context("Invalid UTF-8 in session")?;
    let session: Session = serde_json::from_str(&json)?;

    Ok(Some(session))
}

/// Save the session to the default encrypted file
pub fn save(session: &Session) -> Result<()> {
    save_to(session, &paths::session_path()?)
}

/// Save the session to a specific path
pub fn save_to(session: &Session, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create session directory")?;
    }

    let json = serde_json::to_string(session)?;

    let key = derive_key();
    let cipher = Aes256Gcm::new_from_slice(&key).expect("Invalid key length");

    let mut rng = rand::rng();
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rng.fill(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, json.as_bytes())
        .map_err(|_| anyhow::anyhow!("Failed to encrypt session"))?;

    let mut output = nonce_bytes.to_vec();
    output.extend(ciphertext);

    fs::write(path, output).context("Failed to write session file")?;

    // Set restrictive permissions on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }

    Ok(())
}

/// Delete the stored session, if any
pub fn delete() -> Result<bool> {
    delete_at(&paths::session_path()?)
}

/// Delete the session file at a specific path
pub fn delete_at(path: &Path) -> Result<bool> {
    if path.exists() {
        fs::remove_file(path).context("Failed to delete session file")?;
        Ok(true)
    } else {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_session() -> Session {
        Session {
            token: "tok-123".to_string(),
            user_id: 7,
            username: "ada".to_string(),
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.enc");

        save_to(&sample_session(), &path).unwrap();
        let loaded = load_from(&path).unwrap().unwrap();

        assert_eq!(loaded, sample_session());
    }

    #[test]
    fn test_file_is_not_plaintext() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.enc");

        save_to(&sample_session(), &path).unwrap();
        let raw = fs::read(&path).unwrap();

        assert!(!String::from_utf8_lossy(&raw).contains("tok-123"));
    }

    #[test]
    fn test_load_missing_returns_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.enc");

        assert!(load_from(&path).unwrap().is_none());
    }

    #[test]
    fn test_load_truncated_returns_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.enc");
        fs::write(&path, [0u8; 4]).unwrap();

        assert!(load_from(&path).unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.enc");

        save_to(&sample_session(), &path).unwrap();
        assert!(delete_at(&path).unwrap());
        assert!(!path.exists());
        assert!(!delete_at(&path).unwrap());
    }

    #[test]
    fn test_owner_gating() {
        let session = sample_session();
        assert!(session.is_owner("ada"));
        assert!(!session.is_owner("grace"));
    }
}
