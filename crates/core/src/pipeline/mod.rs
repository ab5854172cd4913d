pub mod account_executor;
pub mod identify_creator_use_case;
pub mod infrastructure;
pub mod pipeline_logger;
