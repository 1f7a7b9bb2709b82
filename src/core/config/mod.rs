pub mod settings;
pub mod values;

pub use settings::ModsSettings;
pub use values::ConfigValues;
