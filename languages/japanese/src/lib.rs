pub mod deepl;
pub mod local;
pub mod script;

pub use deepl::DeeplTranslator;
pub use local::LocalModelTranslator;
pub use script::JapaneseScript;
