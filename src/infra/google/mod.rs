// =============================================================================
// GOOGLE DRIVE / DOCS MODULE
// =============================================================================
//
// Backend that serves documents straight from Google Workspace.
//
// **Authentication:**
// A service account is used. Share the lesson-notes folder (or each doc) with
// the service account email; give it "Editor" access on the folder if lesson
// index files should be written there.
//
// **Environment Variables:**
// - `GOOGLE_SERVICE_ACCOUNT_KEY` - Path to the service account JSON key
// - `GOOGLE_SERVICE_ACCOUNT_JSON` - The JSON key content (for deployment)
// - `DRIVE_FOLDER_ID` - Optional folder to list from and write indexes to
//
// Without either variable a `service-account.json` next to the binary is used.

pub mod docs_api;
pub mod drive_client;
pub mod service_account;

pub use drive_client::GoogleDriveClient;
pub use service_account::ServiceAccountAuth;
