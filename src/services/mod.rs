pub mod capture;
pub mod classifier;
pub mod counter_store;
pub mod image_payload;
pub mod pipeline;
pub mod transport;
pub mod workflow;
