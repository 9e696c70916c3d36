//! Session records: leaderboard, aggregate stats, and submission
//!
//! The top-10 leaderboard and lifetime stats persist to LocalStorage. On
//! game over a record is also submitted to the session endpoint,
//! fire-and-forget: failures are logged and never touch gameplay state.

use serde::{Deserialize, Serialize};

/// Maximum number of leaderboard records to keep
pub const MAX_RECORDS: usize = 10;

/// Session endpoint (used only in wasm32)
#[allow(dead_code)]
const SESSION_ENDPOINT: &str = "/api/game/session";

/// Outcome of one finished game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Final score
    pub score: u32,
    /// Seconds survived while playing
    pub survival_time: f32,
    /// Highest complexity reached during the session
    pub complexity_peak: f32,
    /// Unix timestamp (ms) when the game ended
    pub timestamp: f64,
}

/// Lifetime aggregates across all finished games
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionStats {
    pub games_played: u32,
    pub total_score: u64,
    pub total_survival: f64,
    pub best_score: u32,
    pub longest_survival: f32,
}

impl SessionStats {
    pub fn record(&mut self, record: &SessionRecord) {
        self.games_played += 1;
        self.total_score += record.score as u64;
        self.total_survival += record.survival_time as f64;
        self.best_score = self.best_score.max(record.score);
        self.longest_survival = self.longest_survival.max(record.survival_time);
    }

    pub fn average_score(&self) -> f32 {
        if self.games_played == 0 {
            0.0
        } else {
            self.total_score as f32 / self.games_played as f32
        }
    }

    pub fn average_survival(&self) -> f32 {
        if self.games_played == 0 {
            0.0
        } else {
            (self.total_survival / self.games_played as f64) as f32
        }
    }
}

/// Leaderboard plus lifetime stats
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub records: Vec<SessionRecord>,
    pub stats: SessionStats,
}

impl Leaderboard {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "vast_unknown_sessions";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.records.len() < MAX_RECORDS {
            return true;
        }
        // Check if score beats the lowest record
        self.records.last().map(|r| score > r.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.records.iter().position(|r| score > r.score);
        Some(rank.unwrap_or(self.records.len()) + 1)
    }

    /// Add a finished game. Stats always update; the record enters the
    /// leaderboard only if it qualifies.
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add_record(&mut self, record: SessionRecord) -> Option<usize> {
        self.stats.record(&record);

        if !self.qualifies(record.score) {
            return None;
        }

        // Find insertion point (sorted descending by score)
        let score = record.score;
        let pos = self.records.iter().position(|r| score > r.score);
        let rank = match pos {
            Some(i) => {
                self.records.insert(i, record);
                i + 1
            }
            None => {
                self.records.push(record);
                self.records.len()
            }
        };

        // Trim to max size
        self.records.truncate(MAX_RECORDS);

        Some(rank)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.records.first().map(|r| r.score)
    }

    /// Load leaderboard from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(board) = serde_json::from_str::<Leaderboard>(&json) {
                    log::info!("Loaded {} session records", board.records.len());
                    return board;
                }
            }
        }

        log::info!("No session records found, starting fresh");
        Self::new()
    }

    /// Save leaderboard to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Session records saved ({} entries)", self.records.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// Fire-and-forget submission of a finished game (WASM only)
///
/// Serializes `{score, survival_time, complexity_peak}` and POSTs it to the
/// session endpoint from a detached task. Every failure path logs a warning
/// and stops; nothing here can block or fail the game-over flow.
#[cfg(target_arch = "wasm32")]
pub fn submit_session(record: &SessionRecord) {
    use wasm_bindgen::{JsCast, JsValue};

    #[derive(Serialize)]
    struct Payload {
        score: u32,
        survival_time: f32,
        complexity_peak: f32,
    }

    let payload = Payload {
        score: record.score,
        survival_time: record.survival_time,
        complexity_peak: record.complexity_peak,
    };
    let json = match serde_json::to_string(&payload) {
        Ok(json) => json,
        Err(err) => {
            log::warn!("Session payload serialization failed: {err}");
            return;
        }
    };

    wasm_bindgen_futures::spawn_local(async move {
        let Some(window) = web_sys::window() else {
            return;
        };

        let opts = web_sys::RequestInit::new();
        opts.set_method("POST");
        opts.set_body(&JsValue::from_str(&json));

        let request = match web_sys::Request::new_with_str_and_init(SESSION_ENDPOINT, &opts) {
            Ok(request) => request,
            Err(_) => {
                log::warn!("Session request construction failed");
                return;
            }
        };
        let _ = request.headers().set("Content-Type", "application/json");

        match wasm_bindgen_futures::JsFuture::from(window.fetch_with_request(&request)).await {
            Ok(resp) => {
                let ok = resp
                    .dyn_into::<web_sys::Response>()
                    .map(|r| r.ok())
                    .unwrap_or(false);
                if ok {
                    log::info!("Session record submitted");
                } else {
                    log::warn!("Session submission rejected by server");
                }
            }
            Err(_) => log::warn!("Session submission failed"),
        }
    });
}

#[cfg(not(target_arch = "wasm32"))]
pub fn submit_session(_record: &SessionRecord) {
    // No-op for native
}

/// Format a timestamp as a relative date string
#[cfg(target_arch = "wasm32")]
pub fn format_date(timestamp: f64) -> String {
    let now = js_sys::Date::now();
    let diff_ms = now - timestamp;
    let diff_secs = diff_ms / 1000.0;
    let diff_mins = diff_secs / 60.0;
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 1.0 {
        let days = diff_days.floor() as i32;
        if days == 1 {
            "Yesterday".to_string()
        } else if days < 7 {
            format!("{} days ago", days)
        } else {
            // Format as date
            let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp));
            format!(
                "{}/{}/{}",
                date.get_month() + 1,
                date.get_date(),
                date.get_full_year() % 100
            )
        }
    } else if diff_hours >= 1.0 {
        let hours = diff_hours.floor() as i32;
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if diff_mins >= 1.0 {
        let mins = diff_mins.floor() as i32;
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn format_date(_timestamp: f64) -> String {
    "N/A".to_string()
}
