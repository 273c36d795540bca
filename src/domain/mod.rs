// Domain layer - Plain data for tags, history and charts
pub mod chart;
pub mod history;
pub mod locale;
pub mod rows;
pub mod tag;
pub mod units;
