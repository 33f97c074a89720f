pub mod classifier_llm;
pub mod db;

pub use classifier_llm::OpenAiClassifierAdapter;
pub use db::DbAdapter;
