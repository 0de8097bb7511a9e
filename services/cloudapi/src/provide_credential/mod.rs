mod env;
pub use env::EnvCredentialProvider;

mod static_;
pub use static_::StaticCredentialProvider;

mod default;
pub use default::DefaultCredentialProvider;
