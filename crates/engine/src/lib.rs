pub mod poller;
pub mod yahoo;

pub use poller::{Poller, TickerOutcome};
pub use yahoo::YahooClient;
