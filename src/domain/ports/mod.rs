mod clock_port;
mod credential_store_port;
mod downloader_port;
mod image_host_port;
mod responder_port;

pub use clock_port::ClockPort;
pub use credential_store_port::CredentialStorePort;
pub use downloader_port::DownloaderPort;
pub use image_host_port::ImageHostPort;
pub use responder_port::ResponderPort;

#[cfg(test)]
pub use image_host_port::MockImageHostPort;

#[cfg(test)]
pub mod mocks {
    pub use super::clock_port::mock::ManualClock;
    pub use super::credential_store_port::mock::MockCredentialStore;
    pub use super::downloader_port::mock::MockDownloader;
    pub use super::image_host_port::MockImageHostPort;
    pub use super::responder_port::mock::{RecordingResponder, Sent};
}
