mod api;
mod navigation;
mod storage;
mod wallet;

pub use api::HttpBackend;
pub use navigation::BrowserNavigator;
pub use storage::{clear_cart, load_cart, save_cart};
pub use wallet::BrowserWallet;
