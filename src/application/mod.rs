// Application layer - Use cases and orchestration
pub mod chart_builder;
pub mod dashboard_service;
pub mod dashboard_store;
pub mod loading_service;
pub mod refresh_loop;
pub mod series_aligner;
pub mod telemetry_repository;
pub mod theme_service;
