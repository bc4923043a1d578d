pub mod constants;
pub mod extensions;

pub use extensions::ExtensionConfig;
