mod delete;
mod download;
mod list;
mod show;

pub use delete::MessageDeleteCommand;
pub use download::MessageDownloadCommand;
pub use list::MessageListCommand;
pub use show::MessageShowCommand;
