pub mod client;
pub mod image;
pub mod story;
pub mod types;

pub use client::GatewayHttpClient;
pub use image::GatewayImageClient;
pub use story::GatewayStoryClient;
