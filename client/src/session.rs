//! Local session state
//!
//! One JSON file under the user's data dir: the bearer token, the user
//! projection from login (display only), and the poster currently being
//! worked on. This is the only state carried between invocations.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::api::UserProjection;
use crate::poster::VideoInfo;

#[derive(Debug, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserProjection,
    /// The immutable "current poster" value; replaced wholesale by generate
    /// and remix, never mutated in place.
    pub current: Option<VideoInfo>,
}

fn session_path() -> Result<PathBuf> {
    let dir = dirs::data_dir()
        .context("no user data directory available")?
        .join("posterforge");
    fs::create_dir_all(&dir)?;
    Ok(dir.join("session.json"))
}

pub fn load() -> Result<Option<Session>> {
    let path = session_path()?;
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(&path)?;
    Ok(Some(
        serde_json::from_str(&raw).context("session file is corrupt; run login again")?,
    ))
}

pub fn save(session: &Session) -> Result<()> {
    fs::write(session_path()?, serde_json::to_string_pretty(session)?)?;
    Ok(())
}

pub fn clear() -> Result<()> {
    let path = session_path()?;
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}
