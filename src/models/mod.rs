pub mod conversation;
pub mod dataset;
pub mod llm;
pub mod response;
