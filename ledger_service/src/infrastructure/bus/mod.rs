pub mod inmem;
pub mod nats;

pub use inmem::InMemoryBus;
pub use nats::JetStreamBus;
