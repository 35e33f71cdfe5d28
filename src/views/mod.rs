pub mod auth;
pub mod chat;
pub mod credentials;
pub mod dashboard;
pub mod fiscal;
pub mod overview;
pub mod shared;
pub mod upload;

pub use auth::{LoginView, RegisterView};
pub use chat::{ChatPage, ChatPanel};
pub use dashboard::DashboardView;
pub use upload::{UploadPage, UploadPanel};
