pub mod outbox_poller;

pub use outbox_poller::OutboxPoller;
