// Session entity: one photo booth collaboration with a fixed layout and a growing participant list.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aspect-ratio preset chosen when a session is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Story,
    Square,
    Portrait,
    Landscape,
}

impl Layout {
    pub const ALL: [Layout; 4] = [
        Layout::Story,
        Layout::Square,
        Layout::Portrait,
        Layout::Landscape,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Story => "story",
            Layout::Square => "square",
            Layout::Portrait => "portrait",
            Layout::Landscape => "landscape",
        }
    }

    /// Output frame size in pixels as `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Layout::Story => (1080, 566),
            Layout::Square => (1080, 1080),
            Layout::Portrait => (1080, 1350),
            Layout::Landscape => (1080, 1920),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layout::ALL
            .into_iter()
            .find(|layout| layout.as_str() == s)
            .ok_or_else(|| anyhow!("unknown layout: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: String,
    layout: Layout,
    created_at: DateTime<Utc>,
    host_id: String,
    users: Vec<String>,
}

impl Session {
    /// Create a session owned by `host_id`, timestamped now. The host is the
    /// first participant.
    pub fn new(id: String, layout: Layout, host_id: String) -> Self {
        Self::with_created_at(id, layout, host_id, Utc::now())
    }

    /// Create a session with an explicit creation instant.
    pub fn with_created_at(
        id: String,
        layout: Layout,
        host_id: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        let users = vec![host_id.clone()];
        Self {
            id,
            layout,
            created_at,
            host_id,
            users,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn creation_time(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn host_id(&self) -> &str {
        &self.host_id
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    pub fn has_user(&self, user_id: &str) -> bool {
        self.users.iter().any(|u| u == user_id)
    }

    /// Append a participant. Returns `false` if they were already present.
    pub(crate) fn push_user(&mut self, user_id: &str) -> bool {
        if self.has_user(user_id) {
            return false;
        }
        self.users.push(user_id.to_string());
        true
    }

    /// Age of the session at `now`. A creation time in the future counts as zero.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.created_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// Whether the session has outlived `ttl` at `now`.
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) > ttl
    }
}
