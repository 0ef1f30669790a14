mod client;

pub use client::QrClient;
