// Message list windowing and grouping, without any UI dependencies

pub mod config;
pub mod dates;
pub mod display;
pub mod edits;
pub mod error;
pub mod grouping;
pub mod model;
pub mod planner;
pub mod ports;
pub mod queue;
pub mod sticky;
pub mod store;
pub mod test_utils;
pub mod view;
pub mod window;

pub use config::{EngineConfig, ViewPreferences};
pub use error::{Error, Result};
pub use model::{Message, MessageId, Recipient};
pub use view::{Host, MessageListView, RenderPass};
