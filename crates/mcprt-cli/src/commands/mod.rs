pub mod build;
pub mod client;
pub mod completions;
pub mod dev;
pub mod generate;
pub mod info;
pub mod init;
pub mod server;
pub mod test;
pub mod validate;

// Re-export command argument structs
pub use build::BuildArgs;
pub use client::ClientArgs;
pub use completions::CompletionsArgs;
pub use dev::DevArgs;
pub use generate::GenerateArgs;
pub use info::InfoArgs;
pub use init::InitArgs;
pub use server::ServerArgs;
pub use test::TestArgs;
pub use validate::ValidateArgs;
