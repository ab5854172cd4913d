pub mod detection;
pub mod identification;
pub mod imaging;
pub mod pipeline;
pub mod shared;
