//! API workbench core.
//!
//! The engine behind an API testing client: connection profiles, request
//! dispatch with retry and cancellation, a mock responder with a small
//! filter language, bounded request history, a persistent key/value
//! store, and an in-memory activity journal, all fronted by the
//! [`workbench::Workbench`] facade.
//!
//! # Architecture
//!
//! - **models**: Profiles, requests, responses, and their wire shapes
//! - **config**: Global configuration loaded from a JSON settings document
//! - **auth**: Authentication headers derived from a profile
//! - **dispatch**: HTTP dispatch with retries, cancellation, and a TTL cache
//! - **mock**: Offline responder with filterable seeded data
//! - **history**: Bounded, redacting log of past exchanges
//! - **journal**: In-memory activity log with severity levels
//! - **store**: File-backed key/value store with optional secret sealing
//! - **profiles**: CRUD registry over connection profiles
//! - **curl**: cURL command generation for any profile + request pair
//! - **workbench**: The facade tying all of the above together
//!
//! # Example
//!
//! ```no_run
//! use api_workbench::models::HttpMethod;
//! use api_workbench::workbench::Workbench;
//! use api_workbench::models::Profile;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let workbench = Workbench::open("workbench.json")?;
//!
//! let profile = Profile::new("Staging", "https://staging.example.com");
//! let profile_id = profile.id.clone();
//! workbench.add_profile(profile)?;
//!
//! let response = workbench
//!     .send(&profile_id, HttpMethod::GET, "/v1/users", None)
//!     .await?;
//! println!("{} {}", response.status, response.status_text);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod curl;
pub mod dispatch;
pub mod history;
pub mod journal;
pub mod mock;
pub mod models;
pub mod profiles;
pub mod store;
pub mod workbench;

pub use config::{get_config, load_config, WorkbenchConfig};
pub use curl::{curl_command, curl_command_compact};
pub use dispatch::{DispatchError, Dispatcher, ResponseCache};
pub use history::{HistoryEntry, HistoryLog};
pub use journal::{Journal, JournalEntry, LogLevel};
pub use mock::MockResponder;
pub use models::{ApiRequest, ApiResponse, AuthKind, HttpMethod, Profile};
pub use profiles::{ProfileError, ProfileRegistry};
pub use store::{FileStore, StoreError};
pub use workbench::Workbench;
