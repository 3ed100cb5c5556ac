pub mod kafka;

pub use kafka::KafkaResetNotifier;
