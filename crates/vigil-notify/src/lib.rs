pub mod dispatcher;
pub mod message;
pub mod notifier;
pub mod providers;

pub use dispatcher::{AlertDispatcher, NotifyConfig};
pub use message::AlertMessage;
pub use notifier::{Notifier, NotifyResult};
pub use providers::{
    DiscordConfig, DiscordNotifier, EmailConfig, EmailNotifier, SlackConfig, SlackNotifier,
    TelegramConfig, TelegramNotifier, WebhookConfig, WebhookNotifier,
};
