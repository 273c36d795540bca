// Application layer - Widget state, history resolution and use cases
pub mod chart_preparer;
pub mod data_sources;
pub mod error;
pub mod historical_cache;
pub mod history_repository;
pub mod history_resolver;
pub mod synthetic;
pub mod tag_store;
pub mod widget;
pub mod widget_service;
