pub mod extractor;
pub mod handlers;
pub mod normalizer;
pub mod pipeline;
pub mod prompts;
pub mod requester;
