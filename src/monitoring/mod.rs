pub mod telegram;

pub use telegram::{TelegramNotifier, DeliveryStatus};
