pub mod threaded_account_executor;
