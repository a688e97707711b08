// Domain layer - Pure data models
pub mod chart;
pub mod reading;
pub mod status_card;
pub mod theme;
